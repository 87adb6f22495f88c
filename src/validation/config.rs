//! Domain validation for app and user configs.
//!
//! Unlike [`super::SchemaValidator`], every check here runs and all
//! violations are reported together.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::config::schema::{
    AppConfig, BaseDirConfig, BaseDirOverride, UserConfig, UserConfigKind, UserSections,
};
use crate::error::{ConfigError, ConfigResult};
use crate::types::valid_path::{find_invalid_char, has_traversal, is_absolute};

use super::violation::{ValidationViolation, type_label};

const KIND_KEY: &str = "kind";
const WORKING_DIR: &str = "working_dir";
const APP_PROMPT: &str = "app_prompt";
const APP_SCHEMA: &str = "app_schema";
const BASE_DIR: &str = "base_dir";

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_app_config(config: &Value, source: &str) -> ConfigResult<AppConfig> {
        let Value::Mapping(map) = config else {
            return Err(ConfigError::validation(source, vec![object_required(config)]));
        };

        let mut violations = Vec::new();

        let working_dir = required_path(map, WORKING_DIR, WORKING_DIR, &mut violations);
        let prompt_dir = required_section_dir(map, APP_PROMPT, &mut violations);
        let schema_dir = required_section_dir(map, APP_SCHEMA, &mut violations);

        match (working_dir, prompt_dir, schema_dir) {
            (Some(working_dir), Some(prompt_dir), Some(schema_dir)) if violations.is_empty() => {
                Ok(AppConfig {
                    working_dir,
                    app_prompt: BaseDirConfig::new(prompt_dir),
                    app_schema: BaseDirConfig::new(schema_dir),
                })
            }
            _ => Err(ConfigError::validation(source, violations)),
        }
    }

    /// Accepts any input except null. Non-mapping values are read as a
    /// config with no overrides.
    pub fn validate_user_config(config: &Value, source: &str) -> ConfigResult<UserConfig> {
        let map = match config {
            Value::Null => {
                return Err(ConfigError::validation(source, vec![object_required(config)]));
            }
            Value::Mapping(map) => map,
            Value::Tagged(tagged) => return Self::validate_user_config(&tagged.value, source),
            _ => return Ok(UserConfig::default()),
        };

        let mut violations = Vec::new();

        let app_prompt = if has_section(map, APP_PROMPT) {
            optional_section(map, APP_PROMPT, &mut violations)
        } else {
            None
        };
        let app_schema = if has_section(map, APP_SCHEMA) {
            optional_section(map, APP_SCHEMA, &mut violations)
        } else {
            None
        };
        let working_dir = if has_section(map, WORKING_DIR) {
            required_path(map, WORKING_DIR, WORKING_DIR, &mut violations)
        } else {
            None
        };

        let sections = UserSections::from_parts(app_prompt, app_schema);
        check_declared_kind(map, sections.kind(), &mut violations);

        if !violations.is_empty() {
            return Err(ConfigError::validation(source, violations));
        }

        Ok(UserConfig {
            sections,
            working_dir,
            custom: custom_fields(map),
        })
    }
}

/// Present and not null.
fn has_section(map: &Mapping, key: &str) -> bool {
    map.get(key).is_some_and(|value| !value.is_null())
}

fn object_required(value: &Value) -> ValidationViolation {
    ValidationViolation::new(
        "",
        value.clone(),
        "object",
        type_label(value),
        "config must be an object",
    )
}

fn required_path(
    map: &Mapping,
    key: &str,
    field: &str,
    violations: &mut Vec<ValidationViolation>,
) -> Option<String> {
    match map.get(key) {
        Some(Value::String(value)) => {
            check_path_safety(field, value, violations);
            Some(value.clone())
        }
        other => {
            violations.push(ValidationViolation::new(
                field,
                other.cloned().unwrap_or(Value::Null),
                "string",
                other.map(type_label).unwrap_or("undefined"),
                format!("{field} must be a string"),
            ));
            None
        }
    }
}

fn required_section_dir(
    map: &Mapping,
    key: &str,
    violations: &mut Vec<ValidationViolation>,
) -> Option<String> {
    match map.get(key) {
        Some(Value::Mapping(section)) => {
            required_path(section, BASE_DIR, &format!("{key}.{BASE_DIR}"), violations)
        }
        other => {
            violations.push(section_must_be_object(key, other));
            None
        }
    }
}

fn optional_section(
    map: &Mapping,
    key: &str,
    violations: &mut Vec<ValidationViolation>,
) -> Option<BaseDirOverride> {
    match map.get(key) {
        Some(Value::Mapping(section)) => {
            let base_dir = if has_section(section, BASE_DIR) {
                required_path(section, BASE_DIR, &format!("{key}.{BASE_DIR}"), violations)
            } else {
                None
            };
            Some(BaseDirOverride { base_dir })
        }
        other => {
            violations.push(section_must_be_object(key, other));
            None
        }
    }
}

fn section_must_be_object(key: &str, value: Option<&Value>) -> ValidationViolation {
    ValidationViolation::new(
        key,
        value.cloned().unwrap_or(Value::Null),
        "object",
        value.map(type_label).unwrap_or("undefined"),
        format!("{key} must be an object with a string {BASE_DIR}"),
    )
}

/// Non-empty, no reserved characters, no `..`, not absolute.
fn check_path_safety(field: &str, value: &str, violations: &mut Vec<ValidationViolation>) {
    let mut reject = |constraint: String| {
        violations.push(ValidationViolation::new(
            field,
            Value::String(value.to_string()),
            "safe relative path",
            "string",
            constraint,
        ));
    };

    if value.trim().is_empty() {
        reject(format!("{field} must not be empty"));
    }
    if let Some(ch) = find_invalid_char(value) {
        reject(format!("{field} contains invalid character {ch:?}"));
    }
    if has_traversal(value) {
        reject(format!("{field} must not contain '..'"));
    }
    if is_absolute(value.trim()) {
        reject(format!("{field} must be a relative path"));
    }
}

fn check_declared_kind(
    map: &Mapping,
    inferred: UserConfigKind,
    violations: &mut Vec<ValidationViolation>,
) {
    let Some(declared) = map.get(KIND_KEY) else {
        return;
    };
    let expected = "one of empty, prompt_only, schema_only, complete";
    match declared.as_str().map(UserConfigKind::parse) {
        Some(Some(kind)) if kind == inferred => {}
        Some(Some(kind)) => violations.push(ValidationViolation::new(
            KIND_KEY,
            declared.clone(),
            inferred.as_str(),
            kind.as_str(),
            format!("kind '{kind}' does not match the sections present ({inferred})"),
        )),
        _ => violations.push(ValidationViolation::new(
            KIND_KEY,
            declared.clone(),
            expected,
            type_label(declared),
            format!("kind must be {expected}"),
        )),
    }
}

fn custom_fields(map: &Mapping) -> BTreeMap<String, Value> {
    map.iter()
        .filter_map(|(key, value)| Some((key_name(key)?, value.clone())))
        .filter(|(key, _)| ![KIND_KEY, WORKING_DIR, APP_PROMPT, APP_SCHEMA].contains(&key.as_str()))
        .collect()
}

fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    fn violations_of(result: ConfigResult<impl std::fmt::Debug>) -> Vec<ValidationViolation> {
        match result {
            Err(ConfigError::Validation { violations, .. }) => violations,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_valid_app_config() {
        let config = ConfigValidator::validate_app_config(
            &yaml("working_dir: ./work\napp_prompt:\n  base_dir: ./p\napp_schema:\n  base_dir: ./s\n"),
            "app.yml",
        )
        .unwrap();
        assert_eq!(config.working_dir, "./work");
        assert_eq!(config.app_prompt.base_dir, "./p");
        assert_eq!(config.app_schema.base_dir, "./s");
    }

    #[test]
    fn test_app_config_requires_object() {
        let violations = violations_of(ConfigValidator::validate_app_config(&yaml("~"), "app.yml"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].actual, "null");
    }

    #[test]
    fn test_accumulates_one_violation_per_invalid_top_level_field() {
        let violations = violations_of(ConfigValidator::validate_app_config(
            &yaml("working_dir: 123\napp_prompt: text\napp_schema: ~\n"),
            "app.yml",
        ));
        assert_eq!(violations.len(), 3);
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["working_dir", "app_prompt", "app_schema"]);
    }

    #[test]
    fn test_missing_everything_reports_all_three() {
        let violations = violations_of(ConfigValidator::validate_app_config(&yaml("{}"), "app.yml"));
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.actual == "undefined"));
    }

    #[test]
    fn test_path_safety_checks_append_violations() {
        let violations = violations_of(ConfigValidator::validate_app_config(
            &yaml(
                "working_dir: /abs/../dir\napp_prompt:\n  base_dir: 'a|b'\napp_schema:\n  base_dir: ''\n",
            ),
            "app.yml",
        ));
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "working_dir",
                "working_dir",
                "app_prompt.base_dir",
                "app_schema.base_dir"
            ]
        );
    }

    #[test]
    fn test_nested_base_dir_must_be_string() {
        let violations = violations_of(ConfigValidator::validate_app_config(
            &yaml("working_dir: ./w\napp_prompt:\n  base_dir: 5\napp_schema:\n  base_dir: ./s\n"),
            "app.yml",
        ));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "app_prompt.base_dir");
        assert_eq!(violations[0].actual, "number");
    }

    #[test]
    fn test_user_config_rejects_null() {
        let err = ConfigValidator::validate_user_config(&Value::Null, "user.yml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigValidationError);
    }

    #[test]
    fn test_user_config_treats_scalars_and_arrays_as_empty() {
        for src in ["just text", "42", "true", "[1, 2, 3]"] {
            let user = ConfigValidator::validate_user_config(&yaml(src), "user.yml").unwrap();
            assert!(user.is_empty(), "{src}");
        }
    }

    #[test]
    fn test_user_config_infers_variant_from_sections() {
        let user = ConfigValidator::validate_user_config(
            &yaml("app_prompt:\n  base_dir: ./custom\n"),
            "user.yml",
        )
        .unwrap();
        assert_eq!(user.kind(), UserConfigKind::PromptOnly);
        assert_eq!(user.prompt_base_dir(), Some("./custom"));

        let user = ConfigValidator::validate_user_config(
            &yaml("app_prompt:\n  base_dir: ./p\napp_schema:\n  base_dir: ./s\n"),
            "user.yml",
        )
        .unwrap();
        assert_eq!(user.kind(), UserConfigKind::Complete);
    }

    #[test]
    fn test_user_config_keeps_custom_fields() {
        let user = ConfigValidator::validate_user_config(
            &yaml("working_dir: ./mine\nteam: core\nfeatures:\n  beta: true\n"),
            "user.yml",
        )
        .unwrap();
        assert_eq!(user.kind(), UserConfigKind::Empty);
        assert_eq!(user.working_dir.as_deref(), Some("./mine"));
        assert_eq!(user.custom.len(), 2);
        assert_eq!(user.custom["team"], Value::String("core".to_string()));
    }

    #[test]
    fn test_user_config_validates_present_sections() {
        let violations = violations_of(ConfigValidator::validate_user_config(
            &yaml("app_prompt: nope\napp_schema:\n  base_dir: ../escape\nworking_dir: 7\n"),
            "user.yml",
        ));
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["app_prompt", "app_schema.base_dir", "working_dir"]);
    }

    #[test]
    fn test_declared_kind_must_match_sections() {
        let user = ConfigValidator::validate_user_config(
            &yaml("kind: schema_only\napp_schema:\n  base_dir: ./s\n"),
            "user.yml",
        )
        .unwrap();
        assert_eq!(user.kind(), UserConfigKind::SchemaOnly);
        assert!(!user.custom.contains_key("kind"));

        let violations = violations_of(ConfigValidator::validate_user_config(
            &yaml("kind: complete\napp_schema:\n  base_dir: ./s\n"),
            "user.yml",
        ));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "kind");

        let violations = violations_of(ConfigValidator::validate_user_config(
            &yaml("kind: everything\n"),
            "user.yml",
        ));
        assert_eq!(violations[0].field, "kind");
    }
}
