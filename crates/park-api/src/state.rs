//! # Application State
//!
//! Shared state for the Axum application: the parking lot and server config.

use park_core::{LotConfig, ParkingLot, SystemClock};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit lot config file (`LOT_CONFIG`)
    pub lot_config: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            lot_config: std::env::var("LOT_CONFIG").ok(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The lot every handler operates on
    pub lot: Arc<ParkingLot>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment and the lot config file
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let lot_config = load_lot_config(config.lot_config.as_deref())?;
        let lot = ParkingLot::from_config(&lot_config, Arc::new(SystemClock))
            .map_err(|e| anyhow::anyhow!("Failed to build parking lot: {}", e))?;

        Ok(Self::with_lot(lot, config))
    }

    /// Wrap an already built lot
    pub fn with_lot(lot: ParkingLot, config: AppConfig) -> Self {
        Self {
            lot: Arc::new(lot),
            config,
        }
    }
}

/// Load lot configuration from file
fn load_lot_config(explicit: Option<&str>) -> anyhow::Result<LotConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return parse_lot_config(path, &content);
    }

    let config_paths = [
        "config/lot.toml",
        "../config/lot.toml",
        "../../config/lot.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_lot_config(path, &content);
        }
    }

    tracing::warn!("No lot config found, using default lot");
    Ok(LotConfig::default())
}

fn parse_lot_config(path: &str, content: &str) -> anyhow::Result<LotConfig> {
    let config = LotConfig::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!(
        "Loaded {} categories from {}",
        config.categories.len(),
        path
    );
    Ok(config)
}
