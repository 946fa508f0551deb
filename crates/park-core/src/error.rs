//! # Parking Error Types
//!
//! Typed error handling for the parking-lot engine.
//! All lot operations return `Result<T, ParkingError>`.

use crate::ticket::TicketId;
use crate::vehicle::VehicleCategory;
use crate::spot::SpotId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for all parking operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkingError {
    /// Every spot of the category is taken
    #[error("No spot available for {category}")]
    NoSpotAvailable { category: VehicleCategory },

    /// No pool or billing binding exists for the category
    #[error("Unknown vehicle category: {category}")]
    UnknownCategory { category: VehicleCategory },

    /// Spot id is not part of the pool
    #[error("Spot not found: {spot_id}")]
    SpotNotFound { spot_id: SpotId },

    /// Spot still holds a vehicle
    #[error("Spot is occupied: {spot_id}")]
    SpotOccupied { spot_id: SpotId },

    /// Ticket is unknown or already closed
    #[error("Ticket not found or already closed: {ticket_id}")]
    TicketNotFound { ticket_id: TicketId },

    /// Exit time lies before entry time
    #[error("Invalid billing interval: exit {exit} is before entry {entry}")]
    InvalidInterval {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },

    /// Lot configuration errors (bad rates, duplicate categories)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ParkingError {
    /// Returns true if the caller may succeed by trying again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ParkingError::NoSpotAvailable { .. } | ParkingError::SpotOccupied { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ParkingError::NoSpotAvailable { .. } => 503,
            ParkingError::UnknownCategory { .. } => 404,
            ParkingError::SpotNotFound { .. } => 404,
            ParkingError::SpotOccupied { .. } => 409,
            ParkingError::TicketNotFound { .. } => 404,
            ParkingError::InvalidInterval { .. } => 500,
            ParkingError::Configuration(_) => 500,
        }
    }
}

/// Result type alias for parking operations
pub type ParkingResult<T> = Result<T, ParkingError>;
