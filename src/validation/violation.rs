use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

/// One failed structural or path-safety rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationViolation {
    /// Dot-separated field path, empty for the document root.
    pub field: String,
    pub value: Value,
    pub expected: String,
    pub actual: String,
    pub constraint: String,
}

impl ValidationViolation {
    pub fn new(
        field: impl Into<String>,
        value: Value,
        expected: impl Into<String>,
        actual: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value,
            expected: expected.into(),
            actual: actual.into(),
            constraint: constraint.into(),
        }
    }

    /// Re-root this violation under `parent`.
    pub fn prefixed(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.field.is_empty() {
            "<root>"
        } else {
            self.field.as_str()
        };
        write!(
            f,
            "{field}: {} (expected {}, got {})",
            self.constraint, self.expected, self.actual
        )
    }
}

/// Type label used in violations. `null` and `array` are distinct from `object`.
pub fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(tagged) => type_label(&tagged.value),
    }
}
