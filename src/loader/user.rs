use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::config::schema::UserConfig;
use crate::error::{ConfigError, ConfigResult, ConfigType, UserConfigErrorReason};
use crate::validation::ConfigValidator;

use super::safe::SafeConfigLoader;

/// Loads the optional user override layer.
///
/// A missing or empty file yields an empty [`UserConfig`]. Every other
/// failure is reported as `USER_CONFIG_INVALID` with the cause attached.
#[derive(Debug, Clone)]
pub struct UserConfigLoader {
    inner: SafeConfigLoader,
}

impl UserConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: SafeConfigLoader::new(path).with_config_type(ConfigType::User),
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub async fn load(&self) -> ConfigResult<UserConfig> {
        let path = self.inner.path().display().to_string();

        let content = match self.inner.read_file().await {
            Ok(content) => content,
            Err(ConfigError::FileNotFound { .. }) => {
                debug!(path = %path, "No user config found, using app config only");
                return Ok(UserConfig::default());
            }
            Err(err) => return Err(rejected(UserConfigErrorReason::UnknownError, err)),
        };

        let parsed = self
            .inner
            .parse_yaml(&content)
            .map_err(|err| rejected(UserConfigErrorReason::ParseError, err))?;
        if parsed == Value::Null {
            debug!(path = %path, "User config is empty");
            return Ok(UserConfig::default());
        }

        let config = ConfigValidator::validate_user_config(&parsed, &path)
            .map_err(|err| rejected(UserConfigErrorReason::ValidationError, err))?;
        debug!(path = %path, kind = %config.kind(), "User config loaded");
        Ok(config)
    }
}

fn rejected(reason: UserConfigErrorReason, err: ConfigError) -> ConfigError {
    warn!(reason = %reason, error = %err, "User config rejected");
    ConfigError::UserConfigInvalid {
        reason,
        message: err.to_string(),
        details: Some(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserConfigKind;
    use crate::error::ErrorKind;

    fn reason_of(err: ConfigError) -> UserConfigErrorReason {
        match err {
            ConfigError::UserConfigInvalid { reason, .. } => reason,
            other => panic!("expected user config error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_user_config_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let config = UserConfigLoader::new(temp.path().join("user.yml"))
            .load()
            .await
            .unwrap();
        assert!(config.is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_file_is_empty_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user.yml");
        std::fs::write(&path, "# nothing here\n").unwrap();
        let config = UserConfigLoader::new(&path).load().await.unwrap();
        assert_eq!(config.kind(), UserConfigKind::Empty);
    }

    #[tokio::test]
    async fn test_legacy_flat_shape_is_normalized() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user.yml");
        std::fs::write(&path, "app_schema:\n  base_dir: ./mine\nmode: strict\n").unwrap();
        let config = UserConfigLoader::new(&path).load().await.unwrap();
        assert_eq!(config.kind(), UserConfigKind::SchemaOnly);
        assert_eq!(config.schema_base_dir(), Some("./mine"));
        assert!(config.custom.contains_key("mode"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_user_config_invalid() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user.yml");
        std::fs::write(&path, "{{{{").unwrap();
        let err = UserConfigLoader::new(&path).load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserConfigInvalid);
        assert_eq!(reason_of(err), UserConfigErrorReason::ParseError);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_violations() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("user.yml");
        std::fs::write(&path, "app_prompt:\n  base_dir: /etc\n").unwrap();
        let err = UserConfigLoader::new(&path).load().await.unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(reason_of(err), UserConfigErrorReason::ValidationError);
    }
}
