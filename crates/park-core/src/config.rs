//! # Lot Configuration
//!
//! Categories, billing bindings, rates and initial capacity.
//! Loaded from `config/lot.toml`; the defaults describe a lot with ten
//! spots per category, bikes billed per minute and cars by the hour.
//!
//! ```toml
//! currency = "inr"
//!
//! [rates]
//! hourly = 40.0
//! per_minute = 1.0
//!
//! [[categories]]
//! category = "four_wheeler"
//! billing = "hourly"
//! initial_spots = 10
//! ```

use crate::error::{ParkingError, ParkingResult};
use crate::money::{Currency, Money};
use crate::pricing::BillingMode;
use crate::vehicle::VehicleCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Price per billing unit, in major currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Price per started hour
    #[serde(default = "default_hourly")]
    pub hourly: f64,
    /// Price per minute
    #[serde(default = "default_per_minute")]
    pub per_minute: f64,
}

fn default_hourly() -> f64 {
    40.0
}

fn default_per_minute() -> f64 {
    1.0
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            hourly: default_hourly(),
            per_minute: default_per_minute(),
        }
    }
}

/// One category the lot serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub category: VehicleCategory,
    pub billing: BillingMode,
    /// Spots created at startup
    #[serde(default)]
    pub initial_spots: usize,
}

impl CategoryConfig {
    pub fn new(category: VehicleCategory, billing: BillingMode, initial_spots: usize) -> Self {
        Self {
            category,
            billing,
            initial_spots,
        }
    }
}

/// Full lot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotConfig {
    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub rates: RateConfig,

    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            currency: Currency::INR,
            rates: RateConfig::default(),
            categories: vec![
                CategoryConfig::new(VehicleCategory::TwoWheeler, BillingMode::PerMinute, 10),
                CategoryConfig::new(VehicleCategory::FourWheeler, BillingMode::Hourly, 10),
            ],
        }
    }
}

impl LotConfig {
    /// Empty lot (no categories) in the given currency
    pub fn empty(currency: Currency) -> Self {
        Self {
            currency,
            rates: RateConfig::default(),
            categories: Vec::new(),
        }
    }

    /// Builder: add a category
    pub fn with_category(mut self, category: CategoryConfig) -> Self {
        self.categories.push(category);
        self
    }

    /// Builder: set rates
    pub fn with_rates(mut self, hourly: f64, per_minute: f64) -> Self {
        self.rates = RateConfig { hourly, per_minute };
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> ParkingResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ParkingError::Configuration(format!("invalid lot config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite rates and duplicate categories
    pub fn validate(&self) -> ParkingResult<()> {
        for (name, rate) in [("hourly", self.rates.hourly), ("per_minute", self.rates.per_minute)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ParkingError::Configuration(format!(
                    "{name} rate must be a non-negative number, got {rate}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.categories {
            if !seen.insert(entry.category) {
                return Err(ParkingError::Configuration(format!(
                    "category {} configured more than once",
                    entry.category
                )));
            }
        }
        Ok(())
    }

    /// Rate for a billing mode as money
    pub fn rate(&self, mode: BillingMode) -> Money {
        let amount = match mode {
            BillingMode::Hourly => self.rates.hourly,
            BillingMode::PerMinute => self.rates.per_minute,
        };
        Money::new(amount, self.currency)
    }
}
