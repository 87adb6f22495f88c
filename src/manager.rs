use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{ConfigCache, DEFAULT_TTL};
use crate::config::merge::merge_configs;
use crate::config::paths::{Paths, resolve_path};
use crate::config::schema::{MergedConfig, UserConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::loader::{AppConfigLoader, UserConfigLoader};
use crate::result::{ResultExt, from_task};
use crate::types::ValidProfilePrefix;

#[derive(Debug, Clone)]
enum UserConfigSource {
    Default,
    Explicit(PathBuf),
    Disabled,
}

/// Files a [`ConfigManager`] reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigPaths {
    pub app: PathBuf,
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn cache_key(&self) -> String {
        let app = self.app.display().to_string();
        let user = self.user.as_ref().map(|path| path.display().to_string());
        ConfigCache::create_key(&app, user.as_deref())
    }
}

/// Resolves the merged configuration for one project directory.
///
/// Clones share the loaded state, so a clone moved into a task observes the
/// same `current()` as the original.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    profile: Option<ValidProfilePrefix>,
    app_config_path: Option<PathBuf>,
    user_config: UserConfigSource,
    cache: Option<Arc<ConfigCache>>,
    ttl: Duration,
    current: Arc<Mutex<Option<MergedConfig>>>,
}

impl ConfigManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            profile: None,
            app_config_path: None,
            user_config: UserConfigSource::Default,
            cache: Some(ConfigCache::global()),
            ttl: DEFAULT_TTL,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Manager rooted at [`Paths::base_dir`].
    pub fn from_env() -> Self {
        Self::new(Paths::base_dir())
    }

    pub fn with_profile(mut self, profile: ValidProfilePrefix) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Relative paths resolve against the base directory.
    pub fn with_app_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_config_path = Some(path.into());
        self
    }

    pub fn with_user_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_config = UserConfigSource::Explicit(path.into());
        self
    }

    pub fn without_user_config(mut self) -> Self {
        self.user_config = UserConfigSource::Disabled;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn profile(&self) -> Option<&ValidProfilePrefix> {
        self.profile.as_ref()
    }

    pub fn config_paths(&self) -> ConfigPaths {
        let app = match &self.app_config_path {
            Some(path) => self.resolve(path),
            None => Paths::app_config_file(&self.base_dir, self.profile.as_ref()),
        };
        let user = match &self.user_config {
            UserConfigSource::Default => Some(Paths::user_config_file(
                &self.base_dir,
                self.profile.as_ref(),
            )),
            UserConfigSource::Explicit(path) => Some(self.resolve(path)),
            UserConfigSource::Disabled => None,
        };
        ConfigPaths { app, user }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.base_dir, &path.to_string_lossy())
    }

    /// Cache → app → user → merge. The app config is required; a missing
    /// user file contributes no overrides.
    pub async fn get_config(&self) -> ConfigResult<MergedConfig> {
        let paths = self.config_paths();
        let key = paths.cache_key();

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                debug!(key = %key, "Config cache hit");
                self.store(hit.clone());
                return Ok(hit);
            }
        }

        let app = AppConfigLoader::new(&paths.app)
            .load()
            .await
            .log_err("Failed to resolve configuration")?;
        let user = match &paths.user {
            Some(path) => UserConfigLoader::new(path)
                .load()
                .await
                .log_err("Failed to resolve configuration")?,
            None => UserConfig::default(),
        };
        let merged = merge_configs(&app, &user);

        if let Some(cache) = &self.cache {
            cache.set_with_ttl(key.clone(), merged.clone(), self.ttl);
        }
        info!(
            app = %paths.app.display(),
            user_kind = %user.kind(),
            key = %key,
            "Configuration resolved"
        );
        self.store(merged.clone());
        Ok(merged)
    }

    /// [`get_config`](Self::get_config) on a separate task. A panic in the
    /// pipeline is reported as `UNKNOWN_ERROR`.
    pub async fn load_config_safe(&self) -> ConfigResult<MergedConfig> {
        let manager = self.clone();
        from_task(tokio::spawn(async move { manager.get_config().await })).await
    }

    /// The most recently resolved configuration.
    pub fn current(&self) -> ConfigResult<MergedConfig> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ConfigError::not_loaded("call get_config before reading values"))
    }

    pub fn working_dir(&self) -> ConfigResult<PathBuf> {
        Ok(resolve_path(&self.base_dir, &self.current()?.working_dir))
    }

    pub fn prompt_dir(&self) -> ConfigResult<PathBuf> {
        Ok(resolve_path(
            &self.base_dir,
            &self.current()?.app_prompt.base_dir,
        ))
    }

    pub fn schema_dir(&self) -> ConfigResult<PathBuf> {
        Ok(resolve_path(
            &self.base_dir,
            &self.current()?.app_schema.base_dir,
        ))
    }

    /// Forget the loaded config and its cache entry.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.delete(&self.config_paths().cache_key());
        }
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        debug!(base_dir = %self.base_dir.display(), "Configuration invalidated");
    }

    fn store(&self, config: MergedConfig) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(config);
    }
}
