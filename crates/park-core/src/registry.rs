//! # Pool Registry
//!
//! Maps each vehicle category to the pool that parks it. Built once at
//! startup and read-only afterwards.

use crate::error::{ParkingError, ParkingResult};
use crate::spot::SpotPool;
use crate::vehicle::VehicleCategory;
use serde::Serialize;
use std::collections::BTreeMap;

/// Occupancy summary for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolOccupancy {
    pub category: VehicleCategory,
    pub capacity: usize,
    pub occupied: usize,
    pub available: usize,
}

/// Category -> pool lookup table
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: BTreeMap<VehicleCategory, SpotPool>,
}

impl PoolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
        }
    }

    /// One empty pool per known category
    pub fn with_all_categories() -> Self {
        VehicleCategory::ALL
            .into_iter()
            .fold(Self::new(), |registry, category| {
                registry.with_pool(SpotPool::new(category))
            })
    }

    /// Register a pool. A second pool for the same category replaces the first.
    pub fn register(&mut self, pool: SpotPool) {
        self.pools.insert(pool.category(), pool);
    }

    /// Register with builder pattern
    pub fn with_pool(mut self, pool: SpotPool) -> Self {
        self.register(pool);
        self
    }

    /// Pool handling `category`
    pub fn resolve(&self, category: VehicleCategory) -> ParkingResult<&SpotPool> {
        self.pools
            .get(&category)
            .ok_or(ParkingError::UnknownCategory { category })
    }

    /// Categories with a bound pool
    pub fn categories(&self) -> Vec<VehicleCategory> {
        self.pools.keys().copied().collect()
    }

    pub fn occupancy(&self) -> Vec<PoolOccupancy> {
        self.pools
            .values()
            .map(|pool| {
                let spots = pool.spots();
                let occupied = spots.iter().filter(|s| s.is_occupied()).count();
                PoolOccupancy {
                    category: pool.category(),
                    capacity: spots.len(),
                    occupied,
                    available: spots.len() - occupied,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
