//! # Pricing Engine
//!
//! Two-stage Strategy lookup for parking fees.
//!
//! ## Design Pattern
//!
//! The [`CostService`] decides *how a category is billed* (its
//! [`BillingMode`]); a [`RateService`] registered for that mode decides
//! *how the number is computed*. Both tables are fixed at construction.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ PricingEngine::compute(category, entry, exit)                │
//! │   └── CostService::billing_mode(category) -> BillingMode     │
//! │         └── RateService (trait)::compute(entry, exit)        │
//! └──────────────────────────────────────────────────────────────┘
//!                              ▲
//!               ┌──────────────┴──────────────┐
//!       ┌───────┴───────┐             ┌───────┴───────┐
//!       │  HourlyRate   │             │ PerMinuteRate │
//!       └───────────────┘             └───────────────┘
//! ```

use crate::error::{ParkingError, ParkingResult};
use crate::money::Money;
use crate::vehicle::VehicleCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Rate formula bound to a vehicle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// Every started hour is billed in full
    Hourly,
    /// Whole minutes, no rounding
    PerMinute,
}

impl std::fmt::Display for BillingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingMode::Hourly => f.write_str("hourly"),
            BillingMode::PerMinute => f.write_str("per_minute"),
        }
    }
}

/// Whole minutes between entry and exit, rejecting negative stays
pub fn billable_minutes(entry: DateTime<Utc>, exit: DateTime<Utc>) -> ParkingResult<i64> {
    if exit < entry {
        return Err(ParkingError::InvalidInterval { entry, exit });
    }
    Ok((exit - entry).num_minutes())
}

/// Computes a fee for one billing mode.
///
/// Implementations must be pure: same interval, same fee.
pub trait RateService: Send + Sync {
    /// Billing mode this service implements
    fn mode(&self) -> BillingMode;

    /// Fee for a stay from `entry` to `exit`
    fn compute(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> ParkingResult<Money>;
}

/// Type alias for a shared rate service (dynamic dispatch)
pub type BoxedRateService = Arc<dyn RateService>;

/// Bills each started hour at `rate`
#[derive(Debug, Clone, Copy)]
pub struct HourlyRate {
    pub rate: Money,
}

impl HourlyRate {
    pub fn new(rate: Money) -> Self {
        Self { rate }
    }
}

impl RateService for HourlyRate {
    fn mode(&self) -> BillingMode {
        BillingMode::Hourly
    }

    fn compute(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> ParkingResult<Money> {
        let minutes = billable_minutes(entry, exit)?;
        let mut hours = minutes / 60;
        if minutes % 60 != 0 {
            hours += 1;
        }
        Ok(self.rate.times(hours))
    }
}

/// Bills each whole minute at `rate`
#[derive(Debug, Clone, Copy)]
pub struct PerMinuteRate {
    pub rate: Money,
}

impl PerMinuteRate {
    pub fn new(rate: Money) -> Self {
        Self { rate }
    }
}

impl RateService for PerMinuteRate {
    fn mode(&self) -> BillingMode {
        BillingMode::PerMinute
    }

    fn compute(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> ParkingResult<Money> {
        let minutes = billable_minutes(entry, exit)?;
        Ok(self.rate.times(minutes))
    }
}

/// Static category -> billing mode bindings
#[derive(Debug, Clone, Default)]
pub struct CostService {
    bindings: HashMap<VehicleCategory, BillingMode>,
}

impl CostService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, category: VehicleCategory, mode: BillingMode) {
        self.bindings.insert(category, mode);
    }

    /// Bind with builder pattern
    pub fn with_binding(mut self, category: VehicleCategory, mode: BillingMode) -> Self {
        self.bind(category, mode);
        self
    }

    pub fn billing_mode(&self, category: VehicleCategory) -> ParkingResult<BillingMode> {
        self.bindings
            .get(&category)
            .copied()
            .ok_or(ParkingError::UnknownCategory { category })
    }
}

/// Cost service plus one rate service per billing mode
#[derive(Clone, Default)]
pub struct PricingEngine {
    costs: CostService,
    rates: HashMap<BillingMode, BoxedRateService>,
}

impl PricingEngine {
    pub fn new(costs: CostService) -> Self {
        Self {
            costs,
            rates: HashMap::new(),
        }
    }

    /// Register a rate service under its own mode
    pub fn register(&mut self, rate: BoxedRateService) {
        self.rates.insert(rate.mode(), rate);
    }

    /// Register with builder pattern
    pub fn with_rate(mut self, rate: BoxedRateService) -> Self {
        self.register(rate);
        self
    }

    pub fn cost_service(&self) -> &CostService {
        &self.costs
    }

    /// Rate service for a billing mode
    pub fn rate(&self, mode: BillingMode) -> Option<&BoxedRateService> {
        self.rates.get(&mode)
    }

    /// Fee for a `category` vehicle parked from `entry` to `exit`
    pub fn compute(
        &self,
        category: VehicleCategory,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    ) -> ParkingResult<Money> {
        let mode = self.costs.billing_mode(category)?;
        let rate = self.rate(mode).ok_or_else(|| {
            ParkingError::Configuration(format!("no rate registered for {mode} billing"))
        })?;
        rate.compute(entry, exit)
    }
}

impl std::fmt::Debug for PricingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modes: Vec<_> = self.rates.keys().collect();
        modes.sort_by_key(|m| m.to_string());
        f.debug_struct("PricingEngine")
            .field("costs", &self.costs)
            .field("rates", &modes)
            .finish()
    }
}
