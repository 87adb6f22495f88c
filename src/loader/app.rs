use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::schema::AppConfig;
use crate::error::{ConfigResult, ConfigType};
use crate::validation::ConfigValidator;

use super::safe::SafeConfigLoader;

/// Loads the required application config.
#[derive(Debug, Clone)]
pub struct AppConfigLoader {
    inner: SafeConfigLoader,
}

impl AppConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: SafeConfigLoader::new(path).with_config_type(ConfigType::App),
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub async fn load(&self) -> ConfigResult<AppConfig> {
        let content = self.inner.read_file().await?;
        let parsed = self.inner.parse_yaml(&content)?;
        let config =
            ConfigValidator::validate_app_config(&parsed, &self.inner.path().display().to_string())?;
        debug!(path = %self.inner.path().display(), "App config loaded");
        Ok(config)
    }
}
