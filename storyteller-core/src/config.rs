//! Storyteller configuration.
//!
//! Values come from the environment (optionally a `.env` file loaded by the
//! binary) and can be overridden with the builder methods.

use std::time::Duration;
use thiserror::Error;

/// Environment variable toggling verbose diagnostics.
pub const DEBUG_ENV: &str = "DEBUG_AGENT";
/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "STORYTELLER_MODEL";
/// Environment variable capping judge-driven revisions per turn.
pub const MAX_REVISIONS_ENV: &str = "STORYTELLER_MAX_REVISIONS";
/// Environment variable setting the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "STORYTELLER_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Configuration for a storyteller session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    /// Model override; the client default is used when unset.
    pub model: Option<String>,

    /// Maximum judge rejections handled by revising within one turn.
    /// `None` leaves the revision loop uncapped.
    pub max_revisions: Option<u32>,

    /// Request timeout for the generation service.
    pub timeout: Duration,

    /// Verbose diagnostic logging.
    pub debug: bool,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_revisions: None,
            timeout: DEFAULT_TIMEOUT,
            debug: true,
        }
    }
}

impl StoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(DEBUG_ENV) {
            config.debug = parse_flag(&value);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            config.model = Some(model.trim().to_string());
        }
        if let Some(value) = lookup(MAX_REVISIONS_ENV) {
            config.max_revisions = Some(parse_number(MAX_REVISIONS_ENV, &value)?);
        }
        if let Some(value) = lookup(TIMEOUT_ENV) {
            let secs: u64 = parse_number(TIMEOUT_ENV, &value)?;
            if secs == 0 {
                return Err(ConfigError::Zero(TIMEOUT_ENV));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_revisions(mut self, max: u32) -> Self {
        self.max_revisions = Some(max);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Interpret a boolean-like flag: `0`, `false` and `no` (any case) are off,
/// everything else is on.
pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no"
    )
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_flag() {
        for off in ["0", "false", "FALSE", "No", " no "] {
            assert!(!parse_flag(off), "{off} should disable");
        }
        for on in ["1", "true", "yes", "", "verbose"] {
            assert!(parse_flag(on), "{on} should enable");
        }
    }

    #[test]
    fn test_defaults() {
        let config = StoryConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.debug);
        assert_eq!(config.max_revisions, None);
        assert_eq!(config.model, None);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = StoryConfig::from_lookup(lookup(&[
            (DEBUG_ENV, "false"),
            (MODEL_ENV, "claude-3-5-haiku-20241022"),
            (MAX_REVISIONS_ENV, "3"),
            (TIMEOUT_ENV, "30"),
        ]))
        .unwrap();
        assert!(!config.debug);
        assert_eq!(config.model.as_deref(), Some("claude-3-5-haiku-20241022"));
        assert_eq!(config.max_revisions, Some(3));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(matches!(
            StoryConfig::from_lookup(lookup(&[(MAX_REVISIONS_ENV, "lots")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            StoryConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")])),
            Err(ConfigError::Zero(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = StoryConfig::new()
            .with_model("m")
            .with_max_revisions(2)
            .with_timeout(Duration::from_secs(5))
            .with_debug(false);
        assert_eq!(config.model.as_deref(), Some("m"));
        assert_eq!(config.max_revisions, Some(2));
        assert!(!config.debug);
    }
}
