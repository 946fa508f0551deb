//! # Routes
//!
//! Axum router configuration for the parking API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Tickets:
///   - POST /api/v1/tickets - Park a vehicle (enter)
///   - GET  /api/v1/tickets - List open tickets
///   - GET  /api/v1/tickets/{ticket_id} - Get open ticket
///   - POST /api/v1/tickets/{ticket_id}/exit - Release and bill (exit)
///   - GET  /api/v1/reconciliation - Tickets left open by a failed exit
///
/// - Spots:
///   - GET    /api/v1/spots - Occupancy per category
///   - POST   /api/v1/spots - Add a spot
///   - GET    /api/v1/spots/{category} - Spots of one category
///   - DELETE /api/v1/spots/{category}/{spot_id} - Remove a free spot
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ticket_routes = Router::new()
        .route("/", post(handlers::enter).get(handlers::list_tickets))
        .route("/{ticket_id}", get(handlers::get_ticket))
        .route("/{ticket_id}/exit", post(handlers::exit));

    let spot_routes = Router::new()
        .route("/", get(handlers::list_occupancy).post(handlers::add_spot))
        .route("/{category}", get(handlers::list_spots))
        .route("/{category}/{spot_id}", delete(handlers::remove_spot));

    let api_routes = Router::new()
        .nest("/tickets", ticket_routes)
        .nest("/spots", spot_routes)
        .route("/reconciliation", get(handlers::list_reconciliation));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
