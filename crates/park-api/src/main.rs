//! # Parking-Lot RS
//!
//! In-memory parking lot service.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: point at a lot definition (defaults to config/lot.toml)
//! export LOT_CONFIG=config/lot.toml
//! export PORT=8080
//!
//! # Run the server
//! parking-lot
//! ```

use park_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    let categories: Vec<String> = state
        .lot
        .categories()
        .iter()
        .map(|c| c.to_string())
        .collect();
    info!("Categories: {}", categories.join(", "));
    for pool in state.lot.occupancy() {
        info!(
            "Pool {}: {} spots, billed {}",
            pool.category,
            pool.capacity,
            state
                .lot
                .billing_mode(pool.category)
                .map(|m| m.to_string())
                .unwrap_or_else(|_| "nowhere".to_string())
        );
    }

    let app = routes::create_router(state);

    info!("Parking-Lot starting on http://{}", addr);

    if !is_prod {
        info!("Enter: POST http://{}/api/v1/tickets", addr);
        info!("Exit:  POST http://{}/api/v1/tickets/{{ticket_id}}/exit", addr);
        info!("Spots: GET  http://{}/api/v1/spots", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
