use std::env;
use std::str::FromStr;

/// Tracing filter directive, e.g. `info` or `voxchat=debug`.
pub const LOG_ENV: &str = "VOXCHAT_LOG";
/// Clipboard backend name: `system` or `memory`.
pub const CLIPBOARD_ENV: &str = "VOXCHAT_CLIPBOARD";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown clipboard backend: '{0}'. Valid options: 'system', 'memory'")]
    InvalidBackend(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClipboardBackend {
    #[default]
    System,
    Memory,
}

impl FromStr for ClipboardBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "os" => Ok(Self::System),
            "memory" | "headless" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_filter: String,
    pub clipboard: ClipboardBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            clipboard: ClipboardBackend::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from `.env` (if present) and the process environment.
    ///
    /// Variables already set in the environment win over `.env` entries.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_filter = lookup(LOG_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let clipboard = match lookup(CLIPBOARD_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => ClipboardBackend::default(),
        };

        Ok(Self {
            log_filter,
            clipboard,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.clipboard, ClipboardBackend::System);
    }

    #[test]
    fn test_reads_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (LOG_ENV, "voxchat=debug"),
            (CLIPBOARD_ENV, "Memory"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "voxchat=debug");
        assert_eq!(config.clipboard, ClipboardBackend::Memory);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config =
            AppConfig::from_lookup(lookup_from(&[(LOG_ENV, "  "), (CLIPBOARD_ENV, "")])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_backend() {
        let result = AppConfig::from_lookup(lookup_from(&[(CLIPBOARD_ENV, "pasteboard")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidBackend("pasteboard".to_string()))
        );
    }
}
