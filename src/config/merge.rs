use tracing::debug;

use crate::config::schema::{AppConfig, BaseDirConfig, MergedConfig, UserConfig};

/// Apply user overrides on top of the app config.
///
/// A user value replaces the app value only when present; nothing in the
/// user layer can remove an app field. Custom fields pass through unchanged.
pub fn merge_configs(app: &AppConfig, user: &UserConfig) -> MergedConfig {
    let working_dir = user
        .working_dir
        .clone()
        .unwrap_or_else(|| app.working_dir.clone());
    let prompt_dir = user
        .prompt_base_dir()
        .map(str::to_string)
        .unwrap_or_else(|| app.app_prompt.base_dir.clone());
    let schema_dir = user
        .schema_base_dir()
        .map(str::to_string)
        .unwrap_or_else(|| app.app_schema.base_dir.clone());

    debug!(
        user_kind = %user.kind(),
        custom_fields = user.custom.len(),
        "Merged user config over app config"
    );

    MergedConfig {
        working_dir,
        app_prompt: BaseDirConfig::new(prompt_dir),
        app_schema: BaseDirConfig::new(schema_dir),
        custom: user.custom.clone(),
    }
}
