//! Navigator configuration
//!
//! Tunable delays and persistence settings. Loaded from TOML, overridable
//! through `WAYPOINT_*` environment variables, validated before use.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::NavigationError;

/// Prefix of environment variables read by [`NavigatorConfig::merge_with_env`]
pub const ENV_PREFIX: &str = "WAYPOINT_";

/// Upper bound accepted for the deferred-step delays
pub const MAX_DELAY_MS: u64 = 10_000;

/// Default key under which the navigation tree is stored
pub const DEFAULT_STORAGE_KEY: &str = "waypoint.navigation";

/// Settings shared by every navigator of a tree.
///
/// The two delays exist to give the rendering layer time to finish a modal
/// dismissal before the next presentation. A delay of zero runs the deferred
/// step synchronously.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Delay between clearing and setting the modal for a replace-current
    /// presentation
    pub present_delay_ms: u64,
    /// Delay between closing the tree to its initial state and invoking the
    /// replace-root handler
    pub replace_root_delay_ms: u64,
    /// Trailing-edge debounce applied to persistence writes
    pub persist_debounce_ms: u64,
    /// Key under which the tree is stored
    pub storage_key: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            present_delay_ms: 100,
            replace_root_delay_ms: 100,
            persist_debounce_ms: 5_000,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl NavigatorConfig {
    /// Configuration with both deferred steps disabled.
    pub fn immediate() -> Self {
        Self {
            present_delay_ms: 0,
            replace_root_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Present delay as a `Duration`
    pub fn present_delay(&self) -> Duration {
        Duration::from_millis(self.present_delay_ms)
    }

    /// Replace-root delay as a `Duration`
    pub fn replace_root_delay(&self) -> Duration {
        Duration::from_millis(self.replace_root_delay_ms)
    }

    /// Persistence debounce as a `Duration`
    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    /// Parse a TOML document. Missing keys take their default.
    pub fn from_toml_str(content: &str) -> Result<Self, NavigationError> {
        toml::from_str(content)
            .map_err(|e| NavigationError::config(format!("Invalid TOML: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, NavigationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NavigationError::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Merge with `WAYPOINT_*` environment variables
    pub fn merge_with_env(&mut self) -> Result<(), NavigationError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge with an explicit set of `WAYPOINT_*` variables.
    ///
    /// Variables without the prefix are ignored; unknown prefixed keys are an
    /// error.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), NavigationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            if let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) {
                self.set_from_string(&name.to_lowercase(), value.as_ref())?;
            }
        }
        Ok(())
    }

    /// Set a single value by key name
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), NavigationError> {
        let parse_ms = |value: &str| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| NavigationError::config(format!("Invalid value for {key}: {e}")))
        };

        match key {
            "present_delay_ms" => self.present_delay_ms = parse_ms(value)?,
            "replace_root_delay_ms" => self.replace_root_delay_ms = parse_ms(value)?,
            "persist_debounce_ms" => self.persist_debounce_ms = parse_ms(value)?,
            "storage_key" => self.storage_key = value.to_string(),
            other => {
                return Err(NavigationError::config(format!(
                    "Unknown configuration key: {other}"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), NavigationError> {
        if self.present_delay_ms > MAX_DELAY_MS {
            return Err(NavigationError::config(format!(
                "present_delay_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        if self.replace_root_delay_ms > MAX_DELAY_MS {
            return Err(NavigationError::config(format!(
                "replace_root_delay_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        if self.persist_debounce_ms == 0 {
            return Err(NavigationError::config(
                "persist_debounce_ms must be greater than zero",
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(NavigationError::config("storage_key must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = NavigatorConfig::default();
        assert_eq!(config.present_delay(), Duration::from_millis(100));
        assert_eq!(config.persist_debounce(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = NavigatorConfig::from_toml_str("present_delay_ms = 0\n").unwrap();
        assert_eq!(config.present_delay_ms, 0);
        assert_eq!(config.replace_root_delay_ms, 100);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "persist_debounce_ms = 250").unwrap();
        writeln!(file, "storage_key = \"app.nav\"").unwrap();

        let config = NavigatorConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.persist_debounce_ms, 250);
        assert_eq!(config.storage_key, "app.nav");
    }

    #[test]
    fn test_load_missing_file() {
        let err = NavigatorConfig::load_from_file(Path::new("/nonexistent/waypoint.toml"));
        assert_matches!(err, Err(NavigationError::Config { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = NavigatorConfig::from_toml_str("present_delay_ms = \"soon\"");
        assert_matches!(err, Err(NavigationError::Config { .. }));
    }

    #[test]
    fn test_merge_with_vars() {
        let mut config = NavigatorConfig::default();
        config
            .merge_with_vars([
                ("WAYPOINT_PRESENT_DELAY_MS", "0"),
                ("WAYPOINT_STORAGE_KEY", "other"),
                ("HOME", "/root"),
            ])
            .unwrap();
        assert_eq!(config.present_delay_ms, 0);
        assert_eq!(config.storage_key, "other");
    }

    #[test]
    fn test_merge_rejects_unknown_key() {
        let mut config = NavigatorConfig::default();
        let err = config.merge_with_vars([("WAYPOINT_ANIMATION", "on")]);
        assert_matches!(err, Err(NavigationError::Config { .. }));
    }

    #[test]
    fn test_validate() {
        let mut config = NavigatorConfig::default();
        config.present_delay_ms = MAX_DELAY_MS + 1;
        assert!(config.validate().is_err());

        let mut config = NavigatorConfig::default();
        config.persist_debounce_ms = 0;
        assert!(config.validate().is_err());

        let mut config = NavigatorConfig::default();
        config.storage_key = "  ".into();
        assert!(config.validate().is_err());

        assert!(NavigatorConfig::immediate().validate().is_ok());
    }
}
