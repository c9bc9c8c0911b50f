use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub seed_path: Option<PathBuf>,
    pub google_api_key: Option<String>,
    pub places_timeout_secs: u64,
    pub places_max_retries: u32,
    pub places_retry_backoff_ms: u64,
    pub rate_limit_per_minute: usize,
    pub default_radius_km: f64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("seed_path", &self.seed_path)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("places_max_retries", &self.places_max_retries)
            .field("places_retry_backoff_ms", &self.places_retry_backoff_ms)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("default_radius_km", &self.default_radius_km)
            .finish()
    }
}
