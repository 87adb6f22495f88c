use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Baseline application configuration loaded from `app.yml`.
///
/// Example:
/// ```yaml
/// working_dir: ./.agent/breakdown
/// app_prompt:
///   base_dir: ./prompts
/// app_schema:
///   base_dir: ./schema
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Working directory for generated output.
    pub working_dir: String,
    /// Prompt template location.
    pub app_prompt: BaseDirConfig,
    /// Schema file location.
    pub app_schema: BaseDirConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseDirConfig {
    pub base_dir: String,
}

impl BaseDirConfig {
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// A user-level section override; `base_dir` may be left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseDirOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
}

impl BaseDirOverride {
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

/// Tag naming which [`UserSections`] variant a user config holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConfigKind {
    Empty,
    PromptOnly,
    SchemaOnly,
    Complete,
}

impl UserConfigKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UserConfigKind::Empty => "empty",
            UserConfigKind::PromptOnly => "prompt_only",
            UserConfigKind::SchemaOnly => "schema_only",
            UserConfigKind::Complete => "complete",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "empty" => Some(UserConfigKind::Empty),
            "prompt_only" => Some(UserConfigKind::PromptOnly),
            "schema_only" => Some(UserConfigKind::SchemaOnly),
            "complete" => Some(UserConfigKind::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for UserConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which optional sections a user config provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserSections {
    #[default]
    Empty,
    PromptOnly {
        app_prompt: BaseDirOverride,
    },
    SchemaOnly {
        app_schema: BaseDirOverride,
    },
    Complete {
        app_prompt: BaseDirOverride,
        app_schema: BaseDirOverride,
    },
}

impl UserSections {
    pub fn from_parts(
        app_prompt: Option<BaseDirOverride>,
        app_schema: Option<BaseDirOverride>,
    ) -> Self {
        match (app_prompt, app_schema) {
            (None, None) => UserSections::Empty,
            (Some(app_prompt), None) => UserSections::PromptOnly { app_prompt },
            (None, Some(app_schema)) => UserSections::SchemaOnly { app_schema },
            (Some(app_prompt), Some(app_schema)) => UserSections::Complete {
                app_prompt,
                app_schema,
            },
        }
    }

    pub fn kind(&self) -> UserConfigKind {
        match self {
            UserSections::Empty => UserConfigKind::Empty,
            UserSections::PromptOnly { .. } => UserConfigKind::PromptOnly,
            UserSections::SchemaOnly { .. } => UserConfigKind::SchemaOnly,
            UserSections::Complete { .. } => UserConfigKind::Complete,
        }
    }

    pub fn app_prompt(&self) -> Option<&BaseDirOverride> {
        match self {
            UserSections::PromptOnly { app_prompt } | UserSections::Complete { app_prompt, .. } => {
                Some(app_prompt)
            }
            _ => None,
        }
    }

    pub fn app_schema(&self) -> Option<&BaseDirOverride> {
        match self {
            UserSections::SchemaOnly { app_schema } | UserSections::Complete { app_schema, .. } => {
                Some(app_schema)
            }
            _ => None,
        }
    }
}

/// Optional user override layer loaded from `user.yml`.
///
/// Keys other than `kind`, `working_dir`, `app_prompt` and `app_schema` are
/// kept verbatim in `custom`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserConfig {
    pub sections: UserSections,
    pub working_dir: Option<String>,
    pub custom: BTreeMap<String, Value>,
}

impl UserConfig {
    pub fn kind(&self) -> UserConfigKind {
        self.sections.kind()
    }

    pub fn has_prompt_config(&self) -> bool {
        self.sections.app_prompt().is_some()
    }

    pub fn has_schema_config(&self) -> bool {
        self.sections.app_schema().is_some()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.sections, UserSections::Empty)
            && self.working_dir.is_none()
            && self.custom.is_empty()
    }

    pub fn prompt_base_dir(&self) -> Option<&str> {
        self.sections.app_prompt()?.base_dir.as_deref()
    }

    pub fn schema_base_dir(&self) -> Option<&str> {
        self.sections.app_schema()?.base_dir.as_deref()
    }
}

/// App configuration with user overrides applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedConfig {
    pub working_dir: String,
    pub app_prompt: BaseDirConfig,
    pub app_schema: BaseDirConfig,
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
}
