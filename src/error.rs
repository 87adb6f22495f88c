use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationViolation;

pub type ConfigResult<T> = Result<T, ConfigError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which configuration layer a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    App,
    User,
}

impl ConfigType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigType::App => "app",
            ConfigType::User => "user",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathErrorReason {
    EmptyPath,
    PathTraversal,
    AbsolutePathNotAllowed,
    InvalidCharacters,
    PathTooLong,
}

impl PathErrorReason {
    pub fn as_str(self) -> &'static str {
        match self {
            PathErrorReason::EmptyPath => "EMPTY_PATH",
            PathErrorReason::PathTraversal => "PATH_TRAVERSAL",
            PathErrorReason::AbsolutePathNotAllowed => "ABSOLUTE_PATH_NOT_ALLOWED",
            PathErrorReason::InvalidCharacters => "INVALID_CHARACTERS",
            PathErrorReason::PathTooLong => "PATH_TOO_LONG",
        }
    }
}

impl fmt::Display for PathErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserConfigErrorReason {
    ParseError,
    ValidationError,
    UnknownError,
}

impl UserConfigErrorReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UserConfigErrorReason::ParseError => "PARSE_ERROR",
            UserConfigErrorReason::ValidationError => "VALIDATION_ERROR",
            UserConfigErrorReason::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for UserConfigErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`ConfigError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ConfigFileNotFound,
    ConfigParseError,
    ConfigValidationError,
    PathValidationError,
    UserConfigInvalid,
    ConfigNotLoaded,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConfigFileNotFound => "CONFIG_FILE_NOT_FOUND",
            ErrorKind::ConfigParseError => "CONFIG_PARSE_ERROR",
            ErrorKind::ConfigValidationError => "CONFIG_VALIDATION_ERROR",
            ErrorKind::PathValidationError => "PATH_VALIDATION_ERROR",
            ErrorKind::UserConfigInvalid => "USER_CONFIG_INVALID",
            ErrorKind::ConfigNotLoaded => "CONFIG_NOT_LOADED",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every expected failure of the resolution pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound {
        path: PathBuf,
        config_type: Option<ConfigType>,
    },

    #[error("Failed to parse YAML at {path}:{line}:{column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Configuration validation failed for {source_path}")]
    Validation {
        source_path: String,
        violations: Vec<ValidationViolation>,
    },

    #[error("Invalid path '{path}' ({reason}): {message}")]
    PathValidation {
        path: String,
        reason: PathErrorReason,
        message: String,
    },

    #[error("User config invalid ({reason}): {message}")]
    UserConfigInvalid {
        reason: UserConfigErrorReason,
        message: String,
        #[source]
        details: Option<Box<ConfigError>>,
    },

    #[error("Configuration not loaded: {message}")]
    NotLoaded { message: String },

    #[error("Unexpected error: {message}")]
    Unknown {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::FileNotFound { .. } => ErrorKind::ConfigFileNotFound,
            ConfigError::Parse { .. } => ErrorKind::ConfigParseError,
            ConfigError::Validation { .. } => ErrorKind::ConfigValidationError,
            ConfigError::PathValidation { .. } => ErrorKind::PathValidationError,
            ConfigError::UserConfigInvalid { .. } => ErrorKind::UserConfigInvalid,
            ConfigError::NotLoaded { .. } => ErrorKind::ConfigNotLoaded,
            ConfigError::Unknown { .. } => ErrorKind::UnknownError,
        }
    }

    pub(crate) fn path(
        path: impl Into<String>,
        reason: PathErrorReason,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::PathValidation {
            path: path.into(),
            reason,
            message: message.into(),
        }
    }

    pub(crate) fn validation(
        source_path: impl Into<String>,
        violations: Vec<ValidationViolation>,
    ) -> Self {
        ConfigError::Validation {
            source_path: source_path.into(),
            violations,
        }
    }

    pub(crate) fn not_loaded(message: impl Into<String>) -> Self {
        ConfigError::NotLoaded {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        ConfigError::Unknown {
            message: message.into(),
            cause: None,
        }
    }

    pub fn unknown_from<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::Unknown {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Violations carried by this error, looking through a wrapped user-config failure.
    pub fn violations(&self) -> &[ValidationViolation] {
        match self {
            ConfigError::Validation { violations, .. } => violations,
            ConfigError::UserConfigInvalid {
                details: Some(inner),
                ..
            } => inner.violations(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_are_screaming_snake() {
        let err = ConfigError::FileNotFound {
            path: PathBuf::from("breakdown/config/app.yml"),
            config_type: Some(ConfigType::App),
        };
        assert_eq!(err.kind().as_str(), "CONFIG_FILE_NOT_FOUND");
        assert_eq!(ConfigError::unknown("boom").kind(), ErrorKind::UnknownError);
        assert_eq!(
            ConfigError::not_loaded("call get_config first").kind().to_string(),
            "CONFIG_NOT_LOADED"
        );
    }

    #[test]
    fn test_parse_error_message_includes_location() {
        let err = ConfigError::Parse {
            path: PathBuf::from("app.yml"),
            line: 3,
            column: 7,
            message: "did not find expected key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse YAML at app.yml:3:7: did not find expected key"
        );
    }

    #[test]
    fn test_path_error_displays_reason() {
        let err = ConfigError::path("../x", PathErrorReason::PathTraversal, "contains '..'");
        assert!(err.to_string().contains("PATH_TRAVERSAL"));
    }

    #[test]
    fn test_user_config_invalid_exposes_inner_violations() {
        let inner = ConfigError::validation(
            "user.yml",
            vec![ValidationViolation::new(
                "working_dir",
                serde_yaml::Value::Null,
                "string",
                "null",
                "working_dir must be a string",
            )],
        );
        let err = ConfigError::UserConfigInvalid {
            reason: UserConfigErrorReason::ValidationError,
            message: "rejected".to_string(),
            details: Some(Box::new(inner)),
        };
        assert_eq!(err.violations().len(), 1);
        assert!(std::error::Error::source(&err).is_some());
    }
}
