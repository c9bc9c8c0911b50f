pub mod app_config;
pub mod bars;
pub mod config;
pub mod events;
pub mod geo;
pub mod hours;
pub mod seed;
pub mod users;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use bars::{Bar, NewBar, RankedBar};
pub use config::{load_app_config, load_app_config_from_env};
pub use events::{Event, EventType, Organizer, OrganizerKind, Venue};
pub use geo::{calculate_distance, format_distance, Coordinate};
pub use hours::{OpenStatus, WeeklyHours};
pub use seed::{load_seed, SeedFile};
pub use users::{NewUser, User};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[source] serde_yaml::Error),

    #[error("seed validation failed: {0}")]
    Validation(String),
}
