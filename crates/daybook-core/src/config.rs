use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `services.events_api_url`.
pub const EVENTS_API_URL_ENV: &str = "DAYBOOK_EVENTS_API_URL";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service endpoints
    #[serde(default)]
    pub services: ServiceConfig,

    /// Defaults applied to new events
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the event API; `/events` is appended per request
    pub events_api_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            events_api_url: "http://localhost:3000/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Display color given to events created without an explicit one
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Start time pre-selected in the add-event form (`HH:MM`)
    #[serde(default = "default_start")]
    pub default_start: String,

    /// End time pre-selected in the add-event form (`HH:MM`)
    #[serde(default = "default_end")]
    pub default_end: String,
}

fn default_color() -> String {
    "#8B7EC8".to_string()
}

fn default_start() -> String {
    "09:00".to_string()
}

fn default_end() -> String {
    "10:00".to_string()
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_start: default_start(),
            default_end: default_end(),
        }
    }
}

impl Config {
    /// Load configuration from the user config dir, creating a default file if missing.
    ///
    /// `DAYBOOK_EVENTS_API_URL` overrides the configured API URL.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        if let Ok(url) = std::env::var(EVENTS_API_URL_ENV) {
            tracing::debug!("Using events API URL from {}", EVENTS_API_URL_ENV);
            config.services.events_api_url = url;
        }

        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults there if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.services.events_api_url,
            "services.events_api_url",
            &mut result,
        );

        if !is_hex_color(&self.events.default_color) {
            result.add_warning(
                "events.default_color",
                format!(
                    "Not a #RRGGBB color token: {}",
                    self.events.default_color
                ),
            );
        }

        let start = parse_hhmm(&self.events.default_start);
        let end = parse_hhmm(&self.events.default_end);
        match (start, end) {
            (Some(start), Some(end)) if start >= end => {
                result.add_error(
                    "events.default_end",
                    "Default end time must be later than default start time",
                );
            }
            (None, _) => result.add_error("events.default_start", "Expected HH:MM"),
            (_, None) => result.add_error("events.default_end", "Expected HH:MM"),
            _ => {}
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }

                if url.scheme() == "http"
                    && !matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"))
                {
                    result.add_warning(field_name, "Plain http to a non-local host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.services.events_api_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "services.events_api_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.services.events_api_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_remote_http_is_warning() {
        let mut config = Config::default();
        config.services.events_api_url = "http://events.example.com/api".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "services.events_api_url"));
    }

    #[test]
    fn test_default_times_must_be_ordered() {
        let mut config = Config::default();
        config.events.default_start = "11:00".to_string();
        config.events.default_end = "10:00".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "events.default_end"));
    }

    #[test]
    fn test_malformed_default_time() {
        let mut config = Config::default();
        config.events.default_start = "9am".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "events.default_start"));
    }

    #[test]
    fn test_bad_color_is_warning() {
        let mut config = Config::default();
        config.events.default_color = "purple".to_string();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "events.default_color"));
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.services.events_api_url, "http://localhost:3000/api");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.services.events_api_url = "https://cal.example.com/api".to_string();
        config.events.default_color = "#00C9A7".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.services.events_api_url, "https://cal.example.com/api");
        assert_eq!(loaded.events.default_color, "#00C9A7");
    }

    #[test]
    fn test_services_only_file_loads_with_event_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[services]\nevents_api_url = \"https://cal.example.com/api\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.services.events_api_url, "https://cal.example.com/api");
        assert_eq!(loaded.events.default_start, "09:00");
        assert_eq!(loaded.events.default_end, "10:00");
    }

    #[test]
    fn test_empty_file_uses_all_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.services.events_api_url, "http://localhost:3000/api");
        assert_eq!(loaded.events.default_color, "#8B7EC8");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[services\nevents_api_url = 3").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    // The only test that touches process environment; keep it that way.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_env_overrides_api_url() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
        std::env::set_var(EVENTS_API_URL_ENV, "https://override.example.com/api");

        let loaded = Config::load();

        std::env::remove_var(EVENTS_API_URL_ENV);
        std::env::remove_var("XDG_CONFIG_HOME");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.services.events_api_url, "https://override.example.com/api");
        // The file on disk keeps the default; the override is applied at load time.
        let on_disk = Config::load_from(&dir.path().join("daybook").join("config.toml")).unwrap();
        assert_eq!(on_disk.services.events_api_url, "http://localhost:3000/api");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
