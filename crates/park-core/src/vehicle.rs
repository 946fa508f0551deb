//! # Vehicle Types
//!
//! Vehicles and the closed set of categories the lot knows how to park.

use serde::{Deserialize, Serialize};

/// Vehicle category. Each category gets its own spot pool and billing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    /// Motorcycles, scooters
    TwoWheeler,
    /// Cars
    FourWheeler,
}

impl VehicleCategory {
    /// All known categories, in a stable order
    pub const ALL: [VehicleCategory; 2] = [VehicleCategory::TwoWheeler, VehicleCategory::FourWheeler];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "two_wheeler",
            VehicleCategory::FourWheeler => "four_wheeler",
        }
    }
}

impl std::fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An arriving vehicle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    /// Registration plate (e.g., "KA-01-AB-1234")
    pub plate: String,
    /// Category deciding pool and billing
    pub category: VehicleCategory,
}

impl Vehicle {
    pub fn new(plate: impl Into<String>, category: VehicleCategory) -> Self {
        Self {
            plate: plate.into(),
            category,
        }
    }

    pub fn two_wheeler(plate: impl Into<String>) -> Self {
        Self::new(plate, VehicleCategory::TwoWheeler)
    }

    pub fn four_wheeler(plate: impl Into<String>) -> Self {
        Self::new(plate, VehicleCategory::FourWheeler)
    }
}
