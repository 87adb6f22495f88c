//! Declarative structural validation of parsed YAML.
//!
//! [`SchemaValidator::validate`] walks the schema's fields in declared order
//! and stops at the first violation. Keys that the schema does not mention
//! are ignored.

use std::fmt;

use serde_yaml::Value;

use super::violation::{ValidationViolation, type_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        type_label(value) == self.as_str()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type FieldCheck = Box<dyn Fn(&Value) -> Result<(), ValidationViolation> + Send + Sync>;

pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub nested: Option<Schema>,
    pub validator: Option<FieldCheck>,
}

impl SchemaField {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            nested: None,
            validator: None,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.nested = Some(schema);
        self
    }

    pub fn with_validator<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), ValidationViolation> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(check));
        self
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), ValidationViolation> {
        let value = match value {
            Some(Value::Null) | None if self.required => {
                return Err(ValidationViolation::new(
                    &self.name,
                    value.cloned().unwrap_or(Value::Null),
                    self.field_type.as_str(),
                    value.map(type_label).unwrap_or("undefined"),
                    format!("required field '{}' is missing", self.name),
                ));
            }
            Some(Value::Null) | None => return Ok(()),
            Some(value) => value,
        };

        if !self.field_type.matches(value) {
            return Err(ValidationViolation::new(
                &self.name,
                value.clone(),
                self.field_type.as_str(),
                type_label(value),
                format!("field '{}' must be of type {}", self.name, self.field_type),
            ));
        }

        if let (FieldType::Object, Some(nested)) = (self.field_type, &self.nested) {
            SchemaValidator::validate(value, nested).map_err(|v| v.prefixed(&self.name))?;
        }

        if let Some(check) = &self.validator {
            check(value)?;
        }

        Ok(())
    }
}

impl fmt::Debug for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaField")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("nested", &self.nested)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }
}

pub struct SchemaValidator;

impl SchemaValidator {
    /// Returns the first violation found, or `Ok(())`.
    pub fn validate(value: &Value, schema: &Schema) -> Result<(), ValidationViolation> {
        let Value::Mapping(map) = value else {
            return Err(ValidationViolation::new(
                "",
                value.clone(),
                "object",
                type_label(value),
                "value must be an object",
            ));
        };

        for field in &schema.fields {
            field.validate(map.get(field.name.as_str()))?;
        }
        Ok(())
    }

    /// `working_dir`, `app_prompt.base_dir` and `app_schema.base_dir`, all required.
    pub fn app_config_schema() -> Schema {
        Schema::new(vec![
            SchemaField::required("working_dir", FieldType::String)
                .with_validator(non_empty_string("working_dir")),
            SchemaField::required("app_prompt", FieldType::Object).with_schema(base_dir_schema(true)),
            SchemaField::required("app_schema", FieldType::Object).with_schema(base_dir_schema(true)),
        ])
    }

    /// Same fields as the app schema, all optional.
    pub fn user_config_schema() -> Schema {
        Schema::new(vec![
            SchemaField::optional("working_dir", FieldType::String)
                .with_validator(non_empty_string("working_dir")),
            SchemaField::optional("app_prompt", FieldType::Object).with_schema(base_dir_schema(false)),
            SchemaField::optional("app_schema", FieldType::Object).with_schema(base_dir_schema(false)),
        ])
    }
}

fn base_dir_schema(required: bool) -> Schema {
    let field = if required {
        SchemaField::required("base_dir", FieldType::String)
    } else {
        SchemaField::optional("base_dir", FieldType::String)
    };
    Schema::new(vec![field.with_validator(non_empty_string("base_dir"))])
}

/// Custom check rejecting blank strings.
pub fn non_empty_string(field: &'static str) -> impl Fn(&Value) -> Result<(), ValidationViolation> {
    move |value| match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ValidationViolation::new(
            field,
            value.clone(),
            "non-empty string",
            type_label(value),
            format!("field '{field}' must not be empty"),
        )),
    }
}
