use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ServerError;

/// Settings loaded from an optional TOML file. Every field has a usable
/// default so `warren-server run` works with no `--config` at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub guest_command: String,
    pub restart_cooldown_secs: u64,
    pub subscription_ttl_secs: u64,
    pub rlimits: RlimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guest_command: "python3".to_string(),
            restart_cooldown_secs: 2,
            subscription_ttl_secs: 300,
            rlimits: RlimitConfig::default(),
        }
    }
}

/// Overrides handed to a guest's own startup (a real guest binary applies
/// these via `warren_guest::limits`); the server only loads and forwards
/// them, since it never becomes the guest process itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RlimitConfig {
    pub address_space_bytes: Option<u64>,
    pub cpu_seconds: Option<u64>,
    pub open_files: Option<u64>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|err| ServerError::Config(format!("{}: {err}", path.display())))?;
        toml::from_str(&text).map_err(|err| ServerError::Config(err.to_string()))
    }

    pub fn restart_cooldown(&self) -> Duration {
        Duration::from_secs(self.restart_cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_usable_guest_command() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.guest_command, "python3");
        assert_eq!(config.restart_cooldown(), Duration::from_secs(2));
    }

    #[test]
    fn missing_file_reports_a_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/warren.toml"))).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warren.toml");
        std::fs::write(&path, "guest_command = \"warren-guest-runtime\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.guest_command, "warren-guest-runtime");
        assert_eq!(config.restart_cooldown_secs, 2);
        assert!(config.rlimits.open_files.is_none());
    }

    #[test]
    fn rlimits_section_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warren.toml");
        std::fs::write(
            &path,
            "restart_cooldown_secs = 5\n\n[rlimits]\ncpu_seconds = 30\nopen_files = 64\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.restart_cooldown_secs, 5);
        assert_eq!(config.rlimits.cpu_seconds, Some(30));
        assert_eq!(config.rlimits.open_files, Some(64));
        assert!(config.rlimits.address_space_bytes.is_none());
    }
}
