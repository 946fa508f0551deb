//! # park-core
//!
//! Core types and engine for the parking-lot-rs spot allocator.
//!
//! This crate provides:
//! - `SpotPool` and `PoolRegistry` for per-category spot allocation
//! - `PricingEngine` with `CostService` and `RateService` strategies
//! - `TicketStore` for open and closed tickets
//! - `ParkingLot`, the entry/exit orchestrator
//! - `LotConfig` for TOML-driven setup
//! - `ParkingError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use park_core::{ManualClock, LotConfig, ParkingLot, Vehicle};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::starting_now());
//! let lot = ParkingLot::from_config(&LotConfig::default(), clock.clone()).unwrap();
//!
//! let ticket = lot.enter(Vehicle::four_wheeler("KA-01-AB-1234")).unwrap();
//! clock.advance_minutes(125);
//!
//! let receipt = lot.exit(ticket.id).unwrap();
//! assert_eq!(receipt.fee.display(), "₹120.00");
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod lot;
pub mod money;
pub mod pricing;
pub mod registry;
pub mod spot;
pub mod ticket;
pub mod vehicle;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{CategoryConfig, LotConfig, RateConfig};
pub use error::{ParkingError, ParkingResult};
pub use lot::{ExitReceipt, ParkingLot};
pub use money::{Currency, Money};
pub use pricing::{
    BillingMode, BoxedRateService, CostService, HourlyRate, PerMinuteRate, PricingEngine,
    RateService,
};
pub use registry::{PoolOccupancy, PoolRegistry};
pub use spot::{Occupant, Spot, SpotId, SpotPool};
pub use ticket::{Ticket, TicketId, TicketStore};
pub use vehicle::{Vehicle, VehicleCategory};
