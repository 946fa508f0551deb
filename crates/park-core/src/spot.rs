//! # Spots and Spot Pools
//!
//! A pool owns every spot of one vehicle category. Spots are kept in
//! creation order so allocation is reproducible: the first free spot wins.

use crate::error::{ParkingError, ParkingResult};
use crate::ticket::TicketId;
use crate::vehicle::{Vehicle, VehicleCategory};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Unique spot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(pub Uuid);

impl SpotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SpotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Vehicle holding a spot, and the ticket it was parked under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub ticket_id: TicketId,
    pub vehicle: Vehicle,
}

/// A single parking location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub id: SpotId,
    pub category: VehicleCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<Occupant>,
}

impl Spot {
    fn new(category: VehicleCategory) -> Self {
        Self {
            id: SpotId::new(),
            category,
            occupant: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// All spots of one category.
///
/// Mutation is serialized by a single lock; the lock is never held
/// across anything but the in-memory scan.
#[derive(Debug)]
pub struct SpotPool {
    category: VehicleCategory,
    spots: Mutex<Vec<Spot>>,
}

impl SpotPool {
    /// Create an empty pool
    pub fn new(category: VehicleCategory) -> Self {
        Self {
            category,
            spots: Mutex::new(Vec::new()),
        }
    }

    /// Create a pool pre-filled with `count` free spots
    pub fn with_spots(category: VehicleCategory, count: usize) -> Self {
        let pool = Self::new(category);
        for _ in 0..count {
            pool.add_spot();
        }
        pool
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    /// Add a free spot at the end of the allocation order
    pub fn add_spot(&self) -> SpotId {
        let spot = Spot::new(self.category);
        let id = spot.id;
        self.spots.lock().push(spot);
        debug!(category = %self.category, spot_id = %id, "spot added");
        id
    }

    /// Remove a spot. Never evicts a parked vehicle.
    pub fn remove_spot(&self, spot_id: SpotId) -> ParkingResult<()> {
        let mut spots = self.spots.lock();
        let index = spots
            .iter()
            .position(|s| s.id == spot_id)
            .ok_or(ParkingError::SpotNotFound { spot_id })?;

        if spots[index].is_occupied() {
            return Err(ParkingError::SpotOccupied { spot_id });
        }

        spots.remove(index);
        debug!(category = %self.category, spot_id = %spot_id, "spot removed");
        Ok(())
    }

    /// Park `vehicle` under `ticket_id` in the first free spot
    pub fn allocate(&self, ticket_id: TicketId, vehicle: Vehicle) -> ParkingResult<Spot> {
        let mut spots = self.spots.lock();
        let spot = spots
            .iter_mut()
            .find(|s| !s.is_occupied())
            .ok_or(ParkingError::NoSpotAvailable {
                category: self.category,
            })?;

        spot.occupant = Some(Occupant { ticket_id, vehicle });
        Ok(spot.clone())
    }

    /// Free a spot. Releasing a free spot is a no-op.
    pub fn release(&self, spot_id: SpotId) -> ParkingResult<()> {
        self.release_if(spot_id, |_| true)
    }

    /// Free a spot only if it is still held under `ticket_id`.
    ///
    /// A spot freed earlier and since handed out again is left alone, even
    /// when the same vehicle came back for it.
    pub fn vacate(&self, spot_id: SpotId, ticket_id: TicketId) -> ParkingResult<()> {
        self.release_if(spot_id, |occupant| occupant.ticket_id == ticket_id)
    }

    fn release_if(&self, spot_id: SpotId, matches: impl Fn(&Occupant) -> bool) -> ParkingResult<()> {
        let mut spots = self.spots.lock();
        let spot = spots
            .iter_mut()
            .find(|s| s.id == spot_id)
            .ok_or(ParkingError::SpotNotFound { spot_id })?;

        match spot.occupant.as_ref().map(|occupant| matches(occupant)) {
            Some(true) => spot.occupant = None,
            Some(false) => debug!(spot_id = %spot_id, "spot held under another ticket, leaving it"),
            None => debug!(spot_id = %spot_id, "spot already free"),
        }
        Ok(())
    }

    /// Look up a single spot
    pub fn get(&self, spot_id: SpotId) -> Option<Spot> {
        self.spots.lock().iter().find(|s| s.id == spot_id).cloned()
    }

    /// Snapshot of all spots in allocation order
    pub fn spots(&self) -> Vec<Spot> {
        self.spots.lock().clone()
    }

    /// Number of spots in the pool
    pub fn capacity(&self) -> usize {
        self.spots.lock().len()
    }

    /// Number of spots holding a vehicle
    pub fn occupied(&self) -> usize {
        self.spots.lock().iter().filter(|s| s.is_occupied()).count()
    }

    pub fn available(&self) -> usize {
        self.spots.lock().iter().filter(|s| !s.is_occupied()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(plate: &str) -> Vehicle {
        Vehicle::four_wheeler(plate)
    }

    fn park(pool: &SpotPool, plate: &str) -> ParkingResult<Spot> {
        pool.allocate(TicketId::new(), car(plate))
    }

    #[test]
    fn test_add_spot_starts_free() {
        let pool = SpotPool::new(VehicleCategory::FourWheeler);
        let id = pool.add_spot();

        let spot = pool.get(id).unwrap();
        assert_eq!(spot.category, VehicleCategory::FourWheeler);
        assert!(!spot.is_occupied());
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_allocate_in_creation_order() {
        let pool = SpotPool::new(VehicleCategory::FourWheeler);
        let first = pool.add_spot();
        let second = pool.add_spot();

        assert_eq!(park(&pool, "A").unwrap().id, first);
        assert_eq!(park(&pool, "B").unwrap().id, second);

        pool.release(first).unwrap();
        assert_eq!(park(&pool, "C").unwrap().id, first);
    }

    #[test]
    fn test_allocate_when_full() {
        let pool = SpotPool::with_spots(VehicleCategory::TwoWheeler, 1);
        pool.allocate(TicketId::new(), Vehicle::two_wheeler("A")).unwrap();

        let result = pool.allocate(TicketId::new(), Vehicle::two_wheeler("B"));
        assert_eq!(
            result,
            Err(ParkingError::NoSpotAvailable {
                category: VehicleCategory::TwoWheeler
            })
        );
        assert_eq!(pool.occupied(), 1);
    }

    #[test]
    fn test_allocate_empty_pool() {
        let pool = SpotPool::new(VehicleCategory::FourWheeler);
        assert!(matches!(
            park(&pool, "A"),
            Err(ParkingError::NoSpotAvailable { .. })
        ));
    }

    #[test]
    fn test_release_is_idempotent() {
        let pool = SpotPool::with_spots(VehicleCategory::FourWheeler, 1);
        let spot = park(&pool, "A").unwrap();

        pool.release(spot.id).unwrap();
        pool.release(spot.id).unwrap();
        assert_eq!(pool.occupied(), 0);
    }

    #[test]
    fn test_release_unknown_spot() {
        let pool = SpotPool::with_spots(VehicleCategory::FourWheeler, 1);
        let missing = SpotId::new();
        assert_eq!(
            pool.release(missing),
            Err(ParkingError::SpotNotFound { spot_id: missing })
        );
    }

    #[test]
    fn test_vacate_leaves_later_ticket_parked() {
        let pool = SpotPool::with_spots(VehicleCategory::FourWheeler, 1);
        let first = TicketId::new();
        let spot = pool.allocate(first, car("A")).unwrap();
        pool.release(spot.id).unwrap();

        // Same vehicle, new ticket
        let second = TicketId::new();
        pool.allocate(second, car("A")).unwrap();

        pool.vacate(spot.id, first).unwrap();
        let occupant = pool.get(spot.id).unwrap().occupant.unwrap();
        assert_eq!(occupant.ticket_id, second);
        assert_eq!(occupant.vehicle, car("A"));

        pool.vacate(spot.id, second).unwrap();
        assert!(!pool.get(spot.id).unwrap().is_occupied());
    }

    #[test]
    fn test_remove_spot() {
        let pool = SpotPool::new(VehicleCategory::FourWheeler);
        let id = pool.add_spot();

        park(&pool, "A").unwrap();
        assert_eq!(
            pool.remove_spot(id),
            Err(ParkingError::SpotOccupied { spot_id: id })
        );

        pool.release(id).unwrap();
        pool.remove_spot(id).unwrap();
        assert_eq!(pool.capacity(), 0);

        assert_eq!(
            pool.remove_spot(id),
            Err(ParkingError::SpotNotFound { spot_id: id })
        );
    }

    #[test]
    fn test_occupancy_bounded_under_contention() {
        let pool = SpotPool::with_spots(VehicleCategory::TwoWheeler, 8);

        std::thread::scope(|scope| {
            for worker in 0..16 {
                let pool = &pool;
                scope.spawn(move || {
                    for round in 0..50 {
                        let bike = Vehicle::two_wheeler(format!("W{worker}-{round}"));
                        if let Ok(spot) = pool.allocate(TicketId::new(), bike) {
                            assert!(pool.occupied() <= pool.capacity());
                            pool.release(spot.id).unwrap();
                        }
                    }
                });
            }
        });

        assert_eq!(pool.occupied(), 0);
        assert_eq!(pool.capacity(), 8);
    }
}
