use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::info;

pub const MESSAGE_KEY: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    message: Option<String>,
}

/// Where application settings are resolved from: an optional YAML file,
/// optionally overridden by an environment variable.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: PathBuf,
    env_override: Option<String>,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_override: None,
        }
    }

    pub fn with_env_override(mut self, var: impl Into<String>) -> Self {
        self.env_override = Some(var.into());
        self
    }

    pub fn resolve(&self) -> Result<Settings> {
        let file = self.read_file()?;

        let from_env = self
            .env_override
            .as_deref()
            .and_then(|var| std::env::var(var).ok());

        let message = from_env
            .or(file.message)
            .ok_or_else(|| anyhow!("missing configuration key `{}`", MESSAGE_KEY))?;

        Ok(Settings { message })
    }

    // A missing file is an empty source; a malformed one is an error.
    fn read_file(&self) -> Result<SettingsFile> {
        if !self.path.exists() {
            return Ok(SettingsFile::default());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(SettingsFile::default());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }
}

/// Settings that can be re-resolved while the service runs.
pub struct LiveConfig {
    source: ConfigSource,
    current: RwLock<Settings>,
}

impl LiveConfig {
    pub fn load(source: ConfigSource) -> Result<Self> {
        let settings = source.resolve()?;
        Ok(Self {
            source,
            current: RwLock::new(settings),
        })
    }

    pub async fn message(&self) -> String {
        self.current.read().await.message.clone()
    }

    /// Re-resolves the source and swaps in the result. On failure the
    /// previous settings stay in place. Returns the keys that changed.
    pub async fn refresh(&self) -> Result<Vec<String>> {
        let fresh = self.source.resolve()?;
        let mut current = self.current.write().await;

        let mut changed = Vec::new();
        if current.message != fresh.message {
            changed.push(MESSAGE_KEY.to_string());
        }
        *current = fresh;

        if !changed.is_empty() {
            info!("Configuration refreshed, changed keys: {:?}", changed);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn resolves_message_from_file() {
        let file = write_config("message: Hello from config\n");
        let settings = ConfigSource::new(file.path()).resolve().unwrap();
        assert_eq!(settings.message, "Hello from config");
    }

    #[test]
    fn missing_message_is_an_error() {
        let file = write_config("other: value\n");
        assert!(ConfigSource::new(file.path()).resolve().is_err());

        let absent = ConfigSource::new("/nonexistent/application.yml");
        assert!(absent.resolve().is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("message: [unterminated\n");
        assert!(ConfigSource::new(file.path()).resolve().is_err());
    }

    #[test]
    fn env_override_wins_over_file() {
        let file = write_config("message: from file\n");
        let var = "RESERVATION_SERVICE_TEST_MESSAGE_OVERRIDE";
        std::env::set_var(var, "from env");

        let settings = ConfigSource::new(file.path())
            .with_env_override(var)
            .resolve()
            .unwrap();
        std::env::remove_var(var);

        assert_eq!(settings.message, "from env");
    }

    #[tokio::test]
    async fn refresh_reports_changed_keys() {
        let file = write_config("message: first\n");
        let config = LiveConfig::load(ConfigSource::new(file.path())).unwrap();
        assert_eq!(config.message().await, "first");

        assert!(config.refresh().await.unwrap().is_empty());

        std::fs::write(file.path(), "message: second\n").unwrap();
        assert_eq!(config.refresh().await.unwrap(), vec![MESSAGE_KEY.to_string()]);
        assert_eq!(config.message().await, "second");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_value() {
        let file = write_config("message: stable\n");
        let config = LiveConfig::load(ConfigSource::new(file.path())).unwrap();

        std::fs::write(file.path(), "nothing: here\n").unwrap();
        assert!(config.refresh().await.is_err());
        assert_eq!(config.message().await, "stable");
    }
}
