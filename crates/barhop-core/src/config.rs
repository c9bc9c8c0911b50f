use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("BARHOP_ENV", "development"))?;

    let bind_addr: SocketAddr =
        parse_as("BARHOP_BIND_ADDR", &or_default("BARHOP_BIND_ADDR", "0.0.0.0:5000"))?;
    let log_level = or_default("BARHOP_LOG_LEVEL", "info");
    let seed_path = optional("BARHOP_SEED_PATH").map(PathBuf::from);
    let google_api_key = optional("GOOGLE_API_KEY");

    let places_timeout_secs = parse_as(
        "BARHOP_PLACES_TIMEOUT_SECS",
        &or_default("BARHOP_PLACES_TIMEOUT_SECS", "30"),
    )?;
    let places_max_retries = parse_as(
        "BARHOP_PLACES_MAX_RETRIES",
        &or_default("BARHOP_PLACES_MAX_RETRIES", "2"),
    )?;
    let places_retry_backoff_ms = parse_as(
        "BARHOP_PLACES_RETRY_BACKOFF_MS",
        &or_default("BARHOP_PLACES_RETRY_BACKOFF_MS", "500"),
    )?;
    let rate_limit_per_minute: usize = parse_as(
        "BARHOP_RATE_LIMIT_PER_MINUTE",
        &or_default("BARHOP_RATE_LIMIT_PER_MINUTE", "120"),
    )?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BARHOP_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let default_radius_km: f64 = parse_as(
        "BARHOP_DEFAULT_RADIUS_KM",
        &or_default("BARHOP_DEFAULT_RADIUS_KM", "5"),
    )?;
    if !default_radius_km.is_finite() || default_radius_km <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BARHOP_DEFAULT_RADIUS_KM".to_string(),
            reason: "must be a positive number".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        seed_path,
        google_api_key,
        places_timeout_secs,
        places_max_retries,
        places_retry_backoff_ms,
        rate_limit_per_minute,
        default_radius_km,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BARHOP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
