use std::any::Any;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigError, ConfigResult, PathErrorReason};

pub const MAX_PATH_LENGTH: usize = 4096;

static DRIVE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("drive letter pattern is valid"));

/// A relative path that passed every safety check.
///
/// The only way to obtain one is [`ValidPath::create`]; the inner string is
/// trimmed, non-empty, free of `..`, not absolute and free of control or
/// reserved characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidPath(String);

impl ValidPath {
    /// Checks run in a fixed order: empty, traversal, absolute, characters, length.
    pub fn create(path: &str) -> ConfigResult<Self> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::path(
                path,
                PathErrorReason::EmptyPath,
                "path must not be empty",
            ));
        }

        if has_traversal(trimmed) {
            return Err(ConfigError::path(
                path,
                PathErrorReason::PathTraversal,
                "path must not contain '..'",
            ));
        }

        if is_absolute(trimmed) {
            return Err(ConfigError::path(
                path,
                PathErrorReason::AbsolutePathNotAllowed,
                "absolute paths are not allowed",
            ));
        }

        if let Some(ch) = find_invalid_char(trimmed) {
            return Err(ConfigError::path(
                path,
                PathErrorReason::InvalidCharacters,
                format!("invalid character {ch:?}"),
            ));
        }

        if trimmed.len() > MAX_PATH_LENGTH {
            return Err(ConfigError::path(
                path,
                PathErrorReason::PathTooLong,
                format!("path exceeds {MAX_PATH_LENGTH} bytes"),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for ValidPath {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// True when `value` is a `ValidPath` instance.
pub fn is_valid_path(value: &dyn Any) -> bool {
    value.is::<ValidPath>()
}

pub(crate) fn has_traversal(path: &str) -> bool {
    path.contains("..")
}

/// Leading `/`, a drive letter followed by a separator, or a UNC prefix.
pub(crate) fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("\\\\") || DRIVE_LETTER.is_match(path)
}

pub(crate) fn is_invalid_char(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{1f}' | '<' | '>' | ':' | '"' | '|' | '?' | '*')
}

pub(crate) fn find_invalid_char(path: &str) -> Option<char> {
    path.chars().find(|ch| is_invalid_char(*ch))
}
