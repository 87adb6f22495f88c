use tracing::debug;

use crate::error::{ConfigError, ConfigResult, PathErrorReason};
use crate::types::ValidPath;
use crate::types::valid_path::{has_traversal, is_absolute};

/// Path operations that never produce an unchecked path.
pub struct PathValidator;

impl PathValidator {
    /// Join `segments` onto `base`. Blank segments are skipped and the
    /// joined result is validated again after normalization.
    pub fn safe_join(base: &str, segments: &[&str]) -> ConfigResult<ValidPath> {
        let base = ValidPath::create(base)?;
        let mut joined = base.into_inner();

        for segment in segments.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if has_traversal(segment) {
                return Err(ConfigError::path(
                    segment,
                    PathErrorReason::PathTraversal,
                    "path segment must not contain '..'",
                ));
            }
            if is_absolute(segment) {
                return Err(ConfigError::path(
                    segment,
                    PathErrorReason::AbsolutePathNotAllowed,
                    "path segment must be relative",
                ));
            }
            let segment = ValidPath::create(segment)?;
            joined.push('/');
            joined.push_str(segment.value());
        }

        ValidPath::create(&normalize(&joined))
    }

    /// Whether a relative path exists. Format is checked before touching the filesystem.
    pub async fn check_exists(path: &str) -> ConfigResult<bool> {
        let valid = ValidPath::create(path)?;
        tokio::fs::try_exists(valid.value()).await.map_err(|err| {
            ConfigError::unknown_from(format!("failed to probe {}", valid.value()), err)
        })
    }

    pub async fn validate_exists(path: &str) -> ConfigResult<ValidPath> {
        let valid = ValidPath::create(path)?;
        if Self::check_exists(valid.value()).await? {
            Ok(valid)
        } else {
            debug!(path = valid.value(), "Path does not exist");
            Err(ConfigError::FileNotFound {
                path: valid.value().into(),
                config_type: None,
            })
        }
    }

    /// Lexical containment: the normalized target must start with the
    /// normalized base. Symlinks are not resolved, and `/base-extra`
    /// counts as inside `/base`.
    pub fn ensure_within_base(base: &str, target: &str) -> ConfigResult<()> {
        let base = normalize(base);
        let target = normalize(target);
        if target.starts_with(&base) {
            Ok(())
        } else {
            Err(ConfigError::path(
                target,
                PathErrorReason::PathTraversal,
                format!("path escapes base directory {base}"),
            ))
        }
    }

    /// `target` relative to `base`, or `.` when they are the same path.
    pub fn relative_path(base: &str, target: &str) -> ConfigResult<String> {
        Self::ensure_within_base(base, target)?;
        let base = normalize(base);
        let target = normalize(target);
        let relative = target[base.len()..].trim_start_matches('/');
        if relative.is_empty() {
            Ok(".".to_string())
        } else {
            Ok(relative.to_string())
        }
    }
}

/// Collapse duplicate separators, `.` segments and resolvable `..` segments.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
