//! # Parking Lot
//!
//! Entry and exit transactions over the pool registry, ticket store and
//! pricing engine.
//!
//! A vehicle moves Absent -> Parked -> Departed:
//!
//! ```text
//! enter(vehicle)  : registry.resolve -> pool.allocate -> tickets.create
//! exit(ticket_id) : tickets.find -> registry.resolve -> pool.vacate
//!                   -> pricing.compute -> tickets.close
//! ```
//!
//! Spots remember the ticket they were handed out under, so an exit only
//! ever frees the spot of its own stay. If pricing fails on exit the spot
//! stays freed and the ticket stays open, flagged for reconciliation; a
//! later exit of that ticket skips the spot, which may be reused or gone.

use crate::clock::{Clock, SharedClock};
use crate::config::LotConfig;
use crate::error::{ParkingError, ParkingResult};
use crate::money::Money;
use crate::pricing::{BillingMode, CostService, HourlyRate, PerMinuteRate, PricingEngine};
use crate::registry::{PoolOccupancy, PoolRegistry};
use crate::spot::{Spot, SpotId, SpotPool};
use crate::ticket::{Ticket, TicketId, TicketStore};
use crate::vehicle::{Vehicle, VehicleCategory};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a successful exit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitReceipt {
    /// The closed ticket, with its exit time set
    pub ticket: Ticket,
    pub fee: Money,
}

/// The entry/exit orchestrator
pub struct ParkingLot {
    registry: PoolRegistry,
    pricing: PricingEngine,
    tickets: TicketStore,
    clock: SharedClock,
}

impl ParkingLot {
    /// Assemble a lot from explicitly constructed parts
    pub fn new(registry: PoolRegistry, pricing: PricingEngine, clock: SharedClock) -> Self {
        Self {
            registry,
            pricing,
            tickets: TicketStore::new(),
            clock,
        }
    }

    /// Build registry, pricing and initial spots from configuration
    pub fn from_config(config: &LotConfig, clock: SharedClock) -> ParkingResult<Self> {
        config.validate()?;

        let mut registry = PoolRegistry::new();
        let mut costs = CostService::new();
        for entry in &config.categories {
            registry.register(SpotPool::with_spots(entry.category, entry.initial_spots));
            costs.bind(entry.category, entry.billing);
        }

        let pricing = PricingEngine::new(costs)
            .with_rate(Arc::new(HourlyRate::new(config.rate(BillingMode::Hourly))))
            .with_rate(Arc::new(PerMinuteRate::new(config.rate(BillingMode::PerMinute))));

        info!(
            categories = registry.len(),
            currency = %config.currency,
            "parking lot configured"
        );
        Ok(Self::new(registry, pricing, clock))
    }

    /// Park a vehicle and issue its ticket
    pub fn enter(&self, vehicle: Vehicle) -> ParkingResult<Ticket> {
        let pool = self.registry.resolve(vehicle.category)?;
        let ticket_id = TicketId::new();
        let spot = pool.allocate(ticket_id, vehicle.clone()).map_err(|e| {
            warn!(plate = %vehicle.plate, category = %vehicle.category, "entry refused: {}", e);
            e
        })?;

        let ticket = self
            .tickets
            .create(ticket_id, spot.id, vehicle, self.clock.now());
        info!(
            ticket_id = %ticket.id,
            spot_id = %ticket.spot_id,
            plate = %ticket.vehicle.plate,
            "vehicle parked"
        );
        Ok(ticket)
    }

    /// Free the spot, bill the stay and close the ticket
    pub fn exit(&self, ticket_id: TicketId) -> ParkingResult<ExitReceipt> {
        let ticket = self.tickets.find(ticket_id)?;
        let category = ticket.vehicle.category;
        let pool = self.registry.resolve(category)?;

        match pool.vacate(ticket.spot_id, ticket_id) {
            Ok(()) => {}
            Err(ParkingError::SpotNotFound { .. }) if self.tickets.is_flagged(ticket_id) => {
                debug!(
                    ticket_id = %ticket_id,
                    spot_id = %ticket.spot_id,
                    "spot removed after earlier release"
                );
            }
            Err(e) => return Err(e),
        }

        let now = self.clock.now();
        let fee = match self.pricing.compute(category, ticket.entry_time, now) {
            Ok(fee) => fee,
            Err(e) => {
                error!(
                    ticket_id = %ticket_id,
                    spot_id = %ticket.spot_id,
                    "billing failed after spot release, ticket left open for reconciliation: {}",
                    e
                );
                if let Err(flag_err) = self.tickets.flag_for_reconciliation(ticket_id) {
                    warn!(ticket_id = %ticket_id, "could not flag ticket: {}", flag_err);
                }
                return Err(e);
            }
        };

        let ticket = self.tickets.close(ticket_id, now)?;
        info!(
            ticket_id = %ticket_id,
            spot_id = %ticket.spot_id,
            fee = %fee,
            "vehicle departed"
        );
        Ok(ExitReceipt { ticket, fee })
    }

    /// Add a free spot to a category
    pub fn add_spot(&self, category: VehicleCategory) -> ParkingResult<SpotId> {
        let spot_id = self.registry.resolve(category)?.add_spot();
        info!(category = %category, spot_id = %spot_id, "spot added");
        Ok(spot_id)
    }

    /// Remove a free spot from a category
    pub fn remove_spot(&self, category: VehicleCategory, spot_id: SpotId) -> ParkingResult<()> {
        self.registry.resolve(category)?.remove_spot(spot_id)?;
        info!(category = %category, spot_id = %spot_id, "spot removed");
        Ok(())
    }

    /// Open ticket by id
    pub fn ticket(&self, ticket_id: TicketId) -> ParkingResult<Ticket> {
        self.tickets.find(ticket_id)
    }

    /// Closed ticket by id
    pub fn closed_ticket(&self, ticket_id: TicketId) -> Option<Ticket> {
        self.tickets.history(ticket_id)
    }

    pub fn open_tickets(&self) -> Vec<Ticket> {
        self.tickets.open_tickets()
    }

    /// Open tickets whose exit billing failed
    pub fn pending_reconciliation(&self) -> Vec<Ticket> {
        self.tickets.flagged()
    }

    /// Spots of one category in allocation order
    pub fn spots(&self, category: VehicleCategory) -> ParkingResult<Vec<Spot>> {
        Ok(self.registry.resolve(category)?.spots())
    }

    pub fn occupancy(&self) -> Vec<PoolOccupancy> {
        self.registry.occupancy()
    }

    pub fn categories(&self) -> Vec<VehicleCategory> {
        self.registry.categories()
    }

    pub fn billing_mode(&self, category: VehicleCategory) -> ParkingResult<BillingMode> {
        self.pricing.cost_service().billing_mode(category)
    }
}

impl std::fmt::Debug for ParkingLot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingLot")
            .field("registry", &self.registry)
            .field("pricing", &self.pricing)
            .field("open_tickets", &self.tickets.open_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CategoryConfig;
    use crate::money::Currency;
    use chrono::{Duration, Utc};

    fn lot_with(config: LotConfig) -> (ParkingLot, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let lot = ParkingLot::from_config(&config, clock.clone()).unwrap();
        (lot, clock)
    }

    fn single_car_spot() -> LotConfig {
        LotConfig::empty(Currency::INR)
            .with_rates(40.0, 1.0)
            .with_category(CategoryConfig::new(
                VehicleCategory::FourWheeler,
                BillingMode::Hourly,
                0,
            ))
    }

    fn inr(amount: f64) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_single_spot_scenario() {
        let (lot, clock) = lot_with(single_car_spot());
        lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let t1 = lot.enter(Vehicle::four_wheeler("A")).unwrap();

        let refused = lot.enter(Vehicle::four_wheeler("B"));
        assert!(matches!(refused, Err(ParkingError::NoSpotAvailable { .. })));
        assert_eq!(lot.open_tickets().len(), 1);

        clock.advance_minutes(125);
        let receipt = lot.exit(t1.id).unwrap();
        assert_eq!(receipt.fee, inr(120.0));
        assert_eq!(receipt.ticket.exit_time, Some(clock.now()));

        let t2 = lot.enter(Vehicle::four_wheeler("B")).unwrap();
        assert_eq!(t2.spot_id, t1.spot_id);
    }

    #[test]
    fn test_enter_then_exit_frees_spot() {
        let (lot, _clock) = lot_with(LotConfig::default());

        let ticket = lot.enter(Vehicle::two_wheeler("KA-05")).unwrap();
        let receipt = lot.exit(ticket.id).unwrap();

        assert!(!receipt.fee.is_negative());
        assert_eq!(receipt.fee, inr(0.0));
        let two_wheelers = lot
            .occupancy()
            .into_iter()
            .find(|o| o.category == VehicleCategory::TwoWheeler)
            .unwrap();
        assert_eq!(two_wheelers.occupied, 0);
        assert_eq!(two_wheelers.capacity, 10);
    }

    #[test]
    fn test_two_wheeler_bills_per_minute() {
        let (lot, clock) = lot_with(LotConfig::default());

        let ticket = lot.enter(Vehicle::two_wheeler("KA-05")).unwrap();
        clock.advance_minutes(90);

        assert_eq!(lot.exit(ticket.id).unwrap().fee, inr(90.0));
    }

    #[test]
    fn test_exit_twice_fails() {
        let (lot, clock) = lot_with(LotConfig::default());
        let ticket = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        clock.advance_minutes(30);

        lot.exit(ticket.id).unwrap();
        assert_eq!(
            lot.exit(ticket.id),
            Err(ParkingError::TicketNotFound {
                ticket_id: ticket.id
            })
        );
        assert!(lot.closed_ticket(ticket.id).is_some());
    }

    #[test]
    fn test_exit_unknown_ticket() {
        let (lot, _clock) = lot_with(LotConfig::default());
        assert!(matches!(
            lot.exit(TicketId::new()),
            Err(ParkingError::TicketNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_billing_leaves_ticket_open() {
        let (lot, clock) = lot_with(LotConfig::default());
        let ticket = lot.enter(Vehicle::four_wheeler("A")).unwrap();

        clock.advance(Duration::minutes(-10));
        assert!(matches!(
            lot.exit(ticket.id),
            Err(ParkingError::InvalidInterval { .. })
        ));

        assert!(lot.ticket(ticket.id).unwrap().is_open());
        assert_eq!(lot.pending_reconciliation(), vec![ticket.clone()]);
        let spot = lot
            .spots(VehicleCategory::FourWheeler)
            .unwrap()
            .into_iter()
            .find(|s| s.id == ticket.spot_id)
            .unwrap();
        assert!(!spot.is_occupied());

        clock.advance_minutes(70);
        assert_eq!(lot.exit(ticket.id).unwrap().fee, inr(40.0));
        assert!(lot.pending_reconciliation().is_empty());
    }

    #[test]
    fn test_retried_exit_does_not_evict_next_vehicle() {
        let (lot, clock) = lot_with(single_car_spot());
        lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let a = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        clock.advance(Duration::minutes(-1));
        assert!(lot.exit(a.id).is_err());

        let b = lot.enter(Vehicle::four_wheeler("B")).unwrap();
        assert_eq!(a.spot_id, b.spot_id);

        clock.advance_minutes(2);
        lot.exit(a.id).unwrap();
        let spot = &lot.spots(VehicleCategory::FourWheeler).unwrap()[0];
        let occupant = spot.occupant.as_ref().unwrap();
        assert_eq!(occupant.ticket_id, b.id);
        assert_eq!(occupant.vehicle, Vehicle::four_wheeler("B"));
    }

    #[test]
    fn test_retried_exit_does_not_free_same_vehicle_reentry() {
        let (lot, clock) = lot_with(single_car_spot());
        lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let first = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        clock.advance(Duration::minutes(-1));
        assert!(lot.exit(first.id).is_err());

        let second = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        assert_eq!(second.spot_id, first.spot_id);

        clock.advance_minutes(2);
        lot.exit(first.id).unwrap();

        assert!(lot.ticket(second.id).unwrap().is_open());
        assert!(matches!(
            lot.enter(Vehicle::four_wheeler("C")),
            Err(ParkingError::NoSpotAvailable { .. })
        ));

        clock.advance_minutes(60);
        lot.exit(second.id).unwrap();
        lot.enter(Vehicle::four_wheeler("C")).unwrap();
    }

    #[test]
    fn test_flagged_exit_survives_spot_removal() {
        let (lot, clock) = lot_with(single_car_spot());
        let spot_id = lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let ticket = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        clock.advance(Duration::minutes(-1));
        assert!(lot.exit(ticket.id).is_err());

        lot.remove_spot(VehicleCategory::FourWheeler, spot_id).unwrap();

        clock.advance_minutes(31);
        let receipt = lot.exit(ticket.id).unwrap();
        assert_eq!(receipt.fee, inr(40.0));
        assert!(lot.pending_reconciliation().is_empty());
        assert!(lot.closed_ticket(ticket.id).is_some());
    }

    #[test]
    fn test_unflagged_exit_reports_missing_spot() {
        let (lot, _clock) = lot_with(single_car_spot());
        lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let ticket = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        lot.registry
            .resolve(VehicleCategory::FourWheeler)
            .unwrap()
            .release(ticket.spot_id)
            .unwrap();
        lot.remove_spot(VehicleCategory::FourWheeler, ticket.spot_id)
            .unwrap();

        assert_eq!(
            lot.exit(ticket.id),
            Err(ParkingError::SpotNotFound {
                spot_id: ticket.spot_id
            })
        );
        assert!(lot.ticket(ticket.id).unwrap().is_open());
    }

    #[test]
    fn test_unconfigured_category() {
        let (lot, _clock) = lot_with(single_car_spot());

        assert_eq!(
            lot.enter(Vehicle::two_wheeler("B")),
            Err(ParkingError::UnknownCategory {
                category: VehicleCategory::TwoWheeler
            })
        );
        assert!(matches!(
            lot.add_spot(VehicleCategory::TwoWheeler),
            Err(ParkingError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_remove_spot_rules() {
        let (lot, clock) = lot_with(single_car_spot());
        let spot_id = lot.add_spot(VehicleCategory::FourWheeler).unwrap();

        let ticket = lot.enter(Vehicle::four_wheeler("A")).unwrap();
        assert_eq!(
            lot.remove_spot(VehicleCategory::FourWheeler, spot_id),
            Err(ParkingError::SpotOccupied { spot_id })
        );

        let never_created = SpotId::new();
        assert_eq!(
            lot.remove_spot(VehicleCategory::FourWheeler, never_created),
            Err(ParkingError::SpotNotFound {
                spot_id: never_created
            })
        );

        clock.advance_minutes(5);
        lot.exit(ticket.id).unwrap();
        lot.remove_spot(VehicleCategory::FourWheeler, spot_id).unwrap();
        assert!(lot.spots(VehicleCategory::FourWheeler).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_entries_never_overbook() {
        let (lot, _clock) = lot_with(
            LotConfig::empty(Currency::INR).with_category(CategoryConfig::new(
                VehicleCategory::FourWheeler,
                BillingMode::Hourly,
                5,
            )),
        );

        let issued: Vec<Ticket> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..20)
                .map(|i| {
                    let lot = &lot;
                    scope.spawn(move || lot.enter(Vehicle::four_wheeler(format!("CAR-{i}"))))
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().ok().and_then(Result::ok))
                .collect()
        });

        assert_eq!(issued.len(), 5);
        assert_eq!(lot.open_tickets().len(), 5);
        let mut spots: Vec<_> = issued.iter().map(|t| t.spot_id).collect();
        spots.sort_by_key(|s| s.0);
        spots.dedup();
        assert_eq!(spots.len(), 5);
    }
}
