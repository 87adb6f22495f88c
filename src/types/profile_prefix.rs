use std::any::Any;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::ValidationViolation;

static PROFILE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("profile prefix pattern is valid"));

/// Name of a configuration profile, e.g. `production` in `production-app.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ValidProfilePrefix(String);

impl ValidProfilePrefix {
    pub fn create(value: &str) -> ConfigResult<Self> {
        if value.trim().is_empty() {
            return Err(rejected(value, "profile prefix must not be empty"));
        }
        if !PROFILE_PREFIX.is_match(value) {
            return Err(rejected(
                value,
                "profile prefix may only contain ASCII letters, digits and '-'",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidProfilePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ValidProfilePrefix {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::create(s)
    }
}

pub fn is_valid_profile_prefix(value: &dyn Any) -> bool {
    value.is::<ValidProfilePrefix>()
}

fn rejected(value: &str, constraint: &str) -> ConfigError {
    ConfigError::validation(
        "profile_prefix",
        vec![ValidationViolation::new(
            "profile_prefix",
            serde_yaml::Value::String(value.to_string()),
            "string matching ^[a-zA-Z0-9-]+$",
            "string",
            constraint,
        )],
    )
}
