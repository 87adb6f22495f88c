use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, ConfigType};
use crate::validation::{Schema, SchemaValidator, ValidationViolation, type_label};

/// How [`SafeConfigLoader::validate`] checks a parsed document before
/// deserializing it.
pub enum Check<'a> {
    /// A predicate over the raw document.
    Guard(&'a (dyn Fn(&Value) -> bool + Send + Sync)),
    /// A declarative schema; the first violation is reported.
    Schema(&'a Schema),
}

/// Read → parse → validate for a single YAML file.
///
/// Each stage is callable on its own; [`SafeConfigLoader::load`] runs them in
/// order and stops at the first failure.
#[derive(Debug, Clone)]
pub struct SafeConfigLoader {
    path: PathBuf,
    config_type: Option<ConfigType>,
}

impl SafeConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config_type: None,
        }
    }

    pub fn with_config_type(mut self, config_type: ConfigType) -> Self {
        self.config_type = Some(config_type);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config_type(&self) -> Option<ConfigType> {
        self.config_type
    }

    pub async fn read_file(&self) -> ConfigResult<String> {
        debug!(path = %self.path.display(), "Reading config file");
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: self.path.clone(),
                    config_type: self.config_type,
                }
            } else {
                ConfigError::unknown_from(
                    format!("failed to read {}", self.path.display()),
                    err,
                )
            }
        })?;

        String::from_utf8(bytes).map_err(|err| {
            ConfigError::unknown_from(
                format!("{} is not valid UTF-8", self.path.display()),
                err,
            )
        })
    }

    /// Empty input parses to `Value::Null`.
    pub fn parse_yaml(&self, content: &str) -> ConfigResult<Value> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_yaml::from_str(content).map_err(|err| {
            let (line, column) = err
                .location()
                .map(|location| (location.line(), location.column()))
                .unwrap_or((0, 0));
            ConfigError::Parse {
                path: self.path.clone(),
                line,
                column,
                message: err.to_string(),
            }
        })
    }

    pub fn validate<T: DeserializeOwned>(&self, parsed: Value, check: Check<'_>) -> ConfigResult<T> {
        let source = self.path.display().to_string();

        let violation = match check {
            Check::Guard(guard) if !guard(&parsed) => Some(ValidationViolation::new(
                "",
                parsed.clone(),
                "value accepted by type guard",
                type_label(&parsed),
                "document does not have the expected shape",
            )),
            Check::Guard(_) => None,
            Check::Schema(schema) => SchemaValidator::validate(&parsed, schema).err(),
        };
        if let Some(violation) = violation {
            return Err(ConfigError::validation(source, vec![violation]));
        }

        serde_yaml::from_value(parsed.clone()).map_err(|err| {
            ConfigError::validation(
                source,
                vec![ValidationViolation::new(
                    "",
                    parsed,
                    std::any::type_name::<T>(),
                    "incompatible document",
                    err.to_string(),
                )],
            )
        })
    }

    pub async fn load<T: DeserializeOwned>(&self, check: Check<'_>) -> ConfigResult<T> {
        let content = self.read_file().await?;
        let parsed = self.parse_yaml(&content)?;
        self.validate(parsed, check)
    }
}
