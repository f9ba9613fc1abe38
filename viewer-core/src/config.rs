//! Configuration loading: an optional TOML file overlaid with environment
//! variables.

use crate::error::ConfigError;
use crate::types::AppConfig;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

pub const CONFIG_PATH_VAR: &str = "REDDIT_VIEWER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "reddit-viewer.toml";

impl AppConfig {
    /// Loads the file named by `REDDIT_VIEWER_CONFIG` (or the default path),
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file_or_default(Path::new(&path))?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml_str(&contents)
    }

    /// A missing file is not an error here; everything can come from the
    /// environment.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(ConfigError::FileNotFound { path }) => {
                debug!("No configuration file at {}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Applies overrides from `lookup`, which maps an environment variable
    /// name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = lookup("REDDIT_CLIENT_ID") {
            self.reddit_client_id = Some(client_id);
        }
        if let Some(client_secret) = lookup("REDDIT_CLIENT_SECRET") {
            self.reddit_client_secret = Some(client_secret);
        }
        if let Some(user_agent) = lookup("REDDIT_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Some(bind_address) = lookup("BIND_ADDRESS") {
            self.bind_address = bind_address;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| {
                warn!("Invalid PORT value: {port}");
                ConfigError::InvalidValue {
                    field: "port".to_string(),
                    value: port.clone(),
                }
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("reddit_client_id", self.reddit_client_id.as_deref())?;
        require_non_empty("reddit_client_secret", self.reddit_client_secret.as_deref())?;
        require_non_empty("user_agent", Some(&self.user_agent))?;

        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("token_url", &self.token_url),
            ("auth_url", &self.auth_url),
        ] {
            let parsed = Url::parse(value).map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn require_non_empty(field: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingField {
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn complete_config() -> AppConfig {
        AppConfig {
            reddit_client_id: Some("client".to_string()),
            reddit_client_secret: Some("secret".to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://oauth.reddit.com");
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            reddit_client_id = "abc"
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.reddit_client_id.as_deref(), Some("abc"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.scopes, vec!["read".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_file_loading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_agent = \"viewer-test/1.0\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.user_agent, "viewer-test/1.0");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REDDIT_CLIENT_ID", "env-id"),
            ("REDDIT_CLIENT_SECRET", "env-secret"),
            ("PORT", "9090"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.reddit_client_id.as_deref(), Some("env-id"));
        assert_eq!(config.reddit_client_secret.as_deref(), Some("env-secret"));
        assert_eq!(config.port, 9090);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            AppConfig::default().validate(),
            Err(ConfigError::MissingField { field }) if field == "reddit_client_id"
        ));

        let mut config = complete_config();
        config.reddit_client_secret = Some("   ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { field }) if field == "reddit_client_secret"
        ));

        let mut config = complete_config();
        config.api_base_url = "ftp://oauth.reddit.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "api_base_url"
        ));

        assert!(complete_config().validate().is_ok());
    }
}
