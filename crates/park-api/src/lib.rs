//! # park-api
//!
//! HTTP API layer for parking-lot-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for vehicle entry/exit and spot management
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/tickets` | Park a vehicle, issue a ticket |
//! | GET | `/api/v1/tickets` | List open tickets |
//! | GET | `/api/v1/tickets/{ticket_id}` | Get open ticket |
//! | POST | `/api/v1/tickets/{ticket_id}/exit` | Release spot, return fee |
//! | GET | `/api/v1/reconciliation` | Tickets whose exit billing failed |
//! | GET | `/api/v1/spots` | Occupancy per category |
//! | POST | `/api/v1/spots` | Add a spot |
//! | GET | `/api/v1/spots/{category}` | Spots of one category |
//! | DELETE | `/api/v1/spots/{category}/{spot_id}` | Remove a free spot |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
