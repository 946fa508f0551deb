//! # Tickets
//!
//! A ticket binds a vehicle to the spot it was given and records the
//! stay. Open tickets are indexed by id; closed tickets move to an audit
//! index and are never touched again.

use crate::error::{ParkingError, ParkingResult};
use crate::spot::SpotId;
use crate::vehicle::Vehicle;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique ticket identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Record of one stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    /// Spot handed out at entry (reference only; the spot may be gone)
    pub spot_id: SpotId,

    pub vehicle: Vehicle,

    pub entry_time: DateTime<Utc>,

    /// Set once, at close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(
        id: TicketId,
        spot_id: SpotId,
        vehicle: Vehicle,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            spot_id,
            vehicle,
            entry_time,
            exit_time: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}

#[derive(Debug, Default)]
struct Ledger {
    open: HashMap<TicketId, Ticket>,
    closed: HashMap<TicketId, Ticket>,
    flagged: HashSet<TicketId>,
}

/// Open and closed tickets behind one lock
#[derive(Debug, Default)]
pub struct TicketStore {
    ledger: Mutex<Ledger>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue an open ticket under an id reserved at allocation
    pub fn create(
        &self,
        ticket_id: TicketId,
        spot_id: SpotId,
        vehicle: Vehicle,
        entry_time: DateTime<Utc>,
    ) -> Ticket {
        let ticket = Ticket::new(ticket_id, spot_id, vehicle, entry_time);
        self.ledger.lock().open.insert(ticket.id, ticket.clone());
        ticket
    }

    /// Close an open ticket. Closing twice is an error.
    pub fn close(&self, ticket_id: TicketId, exit_time: DateTime<Utc>) -> ParkingResult<Ticket> {
        let mut ledger = self.ledger.lock();
        let entry_time = ledger
            .open
            .get(&ticket_id)
            .map(|t| t.entry_time)
            .ok_or(ParkingError::TicketNotFound { ticket_id })?;

        if exit_time < entry_time {
            return Err(ParkingError::InvalidInterval {
                entry: entry_time,
                exit: exit_time,
            });
        }

        let mut ticket = ledger
            .open
            .remove(&ticket_id)
            .ok_or(ParkingError::TicketNotFound { ticket_id })?;
        ticket.exit_time = Some(exit_time);
        ledger.flagged.remove(&ticket_id);
        ledger.closed.insert(ticket_id, ticket.clone());
        Ok(ticket)
    }

    /// Look up an open ticket
    pub fn find(&self, ticket_id: TicketId) -> ParkingResult<Ticket> {
        self.ledger
            .lock()
            .open
            .get(&ticket_id)
            .cloned()
            .ok_or(ParkingError::TicketNotFound { ticket_id })
    }

    /// Look up a closed ticket
    pub fn history(&self, ticket_id: TicketId) -> Option<Ticket> {
        self.ledger.lock().closed.get(&ticket_id).cloned()
    }

    /// Mark an open ticket as needing manual reconciliation
    pub fn flag_for_reconciliation(&self, ticket_id: TicketId) -> ParkingResult<()> {
        let mut ledger = self.ledger.lock();
        if !ledger.open.contains_key(&ticket_id) {
            return Err(ParkingError::TicketNotFound { ticket_id });
        }
        ledger.flagged.insert(ticket_id);
        Ok(())
    }

    pub fn is_flagged(&self, ticket_id: TicketId) -> bool {
        self.ledger.lock().flagged.contains(&ticket_id)
    }

    /// Open tickets flagged for reconciliation
    pub fn flagged(&self) -> Vec<Ticket> {
        let ledger = self.ledger.lock();
        let mut tickets: Vec<_> = ledger
            .flagged
            .iter()
            .filter_map(|id| ledger.open.get(id).cloned())
            .collect();
        tickets.sort_by_key(|t| t.entry_time);
        tickets
    }

    /// Snapshot of open tickets, oldest first
    pub fn open_tickets(&self) -> Vec<Ticket> {
        let mut tickets: Vec<_> = self.ledger.lock().open.values().cloned().collect();
        tickets.sort_by_key(|t| t.entry_time);
        tickets
    }

    pub fn open_count(&self) -> usize {
        self.ledger.lock().open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.ledger.lock().closed.len()
    }
}
