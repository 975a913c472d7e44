use thiserror::Error;

mod app_config;
mod config;
pub mod events;
pub mod geo;
pub mod news;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use events::{EngagementEvent, EventKind};
pub use geo::{haversine_km, GeoPoint};
pub use news::Article;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
