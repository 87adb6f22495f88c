use std::env;
use std::path::{Component, Path, PathBuf};

use crate::types::ValidProfilePrefix;

pub const BASE_DIR_ENV: &str = "BREAKDOWN_BASE_DIR";
pub const CONFIG_DIR_ENV: &str = "BREAKDOWN_CONFIG_DIR";

const APP_CONFIG_FILE: &str = "app.yml";
const USER_CONFIG_FILE: &str = "user.yml";

/// Default locations of the configuration files.
pub struct Paths;

impl Paths {
    /// Returns the project base directory.
    /// - Override: BREAKDOWN_BASE_DIR env var
    /// - Default: the process working directory
    pub fn base_dir() -> PathBuf {
        if let Ok(path) = env::var(BASE_DIR_ENV) {
            return PathBuf::from(path);
        }
        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Returns the configuration directory for `base`.
    /// - Default: `<base>/breakdown/config`
    /// - Override: BREAKDOWN_CONFIG_DIR env var (relative values resolve against `base`)
    pub fn config_dir(base: &Path) -> PathBuf {
        if let Ok(path) = env::var(CONFIG_DIR_ENV) {
            return resolve_path(base, &path);
        }
        base.join("breakdown").join("config")
    }

    /// `app.yml`, or `<prefix>-app.yml` for a profile.
    pub fn app_config_file(base: &Path, profile: Option<&ValidProfilePrefix>) -> PathBuf {
        Self::config_dir(base).join(profile_file_name(APP_CONFIG_FILE, profile))
    }

    /// `user.yml`, or `<prefix>-user.yml` for a profile.
    pub fn user_config_file(base: &Path, profile: Option<&ValidProfilePrefix>) -> PathBuf {
        Self::config_dir(base).join(profile_file_name(USER_CONFIG_FILE, profile))
    }
}

fn profile_file_name(file: &str, profile: Option<&ValidProfilePrefix>) -> String {
    match profile {
        Some(prefix) => format!("{prefix}-{file}"),
        None => file.to_string(),
    }
}

/// Resolve `path` against `base`; absolute inputs are returned as-is.
/// `.` components are dropped.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };
    joined
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ENV_LOCK;

    fn set_env_var(key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_dir() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env_var(CONFIG_DIR_ENV);
        let base = Path::new("/project");
        assert_eq!(
            Paths::config_dir(base),
            PathBuf::from("/project/breakdown/config")
        );
        assert_eq!(
            Paths::app_config_file(base, None),
            PathBuf::from("/project/breakdown/config/app.yml")
        );
        assert_eq!(
            Paths::user_config_file(base, None),
            PathBuf::from("/project/breakdown/config/user.yml")
        );
    }

    #[test]
    fn test_profile_prefixes_file_names() {
        let _lock = ENV_LOCK.lock().unwrap();
        remove_env_var(CONFIG_DIR_ENV);
        let profile = ValidProfilePrefix::create("production").unwrap();
        let base = Path::new("/project");
        assert_eq!(
            Paths::app_config_file(base, Some(&profile)),
            PathBuf::from("/project/breakdown/config/production-app.yml")
        );
        assert_eq!(
            Paths::user_config_file(base, Some(&profile)),
            PathBuf::from("/project/breakdown/config/production-user.yml")
        );
    }

    #[test]
    fn test_env_override_config_dir() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = tempfile::tempdir().unwrap();

        set_env_var(CONFIG_DIR_ENV, temp.path());
        assert_eq!(Paths::config_dir(Path::new("/elsewhere")), temp.path());

        set_env_var(CONFIG_DIR_ENV, "settings");
        assert_eq!(
            Paths::config_dir(Path::new("/project")),
            PathBuf::from("/project/settings")
        );
        remove_env_var(CONFIG_DIR_ENV);
    }

    #[test]
    fn test_env_override_base_dir() {
        let _lock = ENV_LOCK.lock().unwrap();
        let temp = tempfile::tempdir().unwrap();

        set_env_var(BASE_DIR_ENV, temp.path());
        assert_eq!(Paths::base_dir(), temp.path());
        remove_env_var(BASE_DIR_ENV);
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/project");
        assert_eq!(resolve_path(base, "./work"), PathBuf::from("/project/work"));
        assert_eq!(resolve_path(base, "a/./b"), PathBuf::from("/project/a/b"));
        assert_eq!(resolve_path(base, "/abs/dir"), PathBuf::from("/abs/dir"));
    }
}
