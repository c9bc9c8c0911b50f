use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::bars::NewBar;
use crate::events::Event;
use crate::geo::Coordinate;
use crate::ConfigError;

/// Seed shipped with the binary.
pub const DEFAULT_SEED: &str = include_str!("../seed/default.yaml");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub bars: Vec<NewBar>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Load the seed from `path`, or the built-in seed when `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed(path: Option<&Path>) -> Result<SeedFile, ConfigError> {
    let Some(path) = path else {
        return parse_seed(DEFAULT_SEED);
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_seed(&content)
}

/// Parse and validate seed YAML.
///
/// # Errors
///
/// Returns [`ConfigError::SeedFileParse`] for malformed YAML and
/// [`ConfigError::Validation`] for invalid records.
pub fn parse_seed(content: &str) -> Result<SeedFile, ConfigError> {
    let seed: SeedFile = serde_yaml::from_str(content).map_err(ConfigError::SeedFileParse)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for bar in &seed.bars {
        bar.validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !seen_names.insert(bar.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate bar name: '{}'",
                bar.name
            )));
        }
    }

    for event in &seed.events {
        if event.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "event title must be non-empty".to_string(),
            ));
        }
        Coordinate::new(event.venue.latitude, event.venue.longitude).map_err(|e| {
            ConfigError::Validation(format!("event '{}': {e}", event.title))
        })?;
    }

    Ok(())
}
