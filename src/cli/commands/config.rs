use anyhow::Context;

use crate::cli::Cli;
use crate::config::Paths;
use crate::manager::ConfigManager;
use crate::types::ValidProfilePrefix;

/// One-shot manager for a CLI invocation; the process cache is skipped.
pub fn build_manager(cli: &Cli) -> anyhow::Result<ConfigManager> {
    let base_dir = match &cli.base_dir {
        Some(path) => std::path::absolute(path)
            .with_context(|| format!("invalid base directory {}", path.display()))?,
        None => Paths::base_dir(),
    };

    let mut manager = ConfigManager::new(base_dir).without_cache();
    if let Some(profile) = &cli.profile {
        manager = manager.with_profile(ValidProfilePrefix::create(profile)?);
    }
    if let Some(path) = &cli.app_config {
        manager = manager.with_app_config_path(path);
    }
    if let Some(path) = &cli.user_config {
        manager = manager.with_user_config_path(path);
    }
    if cli.no_user_config {
        manager = manager.without_user_config();
    }
    Ok(manager)
}

pub async fn handle_show(manager: &ConfigManager, json: bool) -> anyhow::Result<()> {
    let config = manager.load_config_safe().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

pub async fn handle_validate(manager: &ConfigManager) -> anyhow::Result<()> {
    let paths = manager.config_paths();
    match manager.load_config_safe().await {
        Ok(_) => {
            println!("\x1b[32mConfiguration is valid\x1b[0m");
            println!("  app:  {}", paths.app.display());
            if let Some(user) = &paths.user {
                println!("  user: {}", user.display());
            }
            Ok(())
        }
        Err(err) => {
            for violation in err.violations() {
                eprintln!("  - {violation}");
            }
            Err(err.into())
        }
    }
}

pub fn handle_paths(manager: &ConfigManager) -> anyhow::Result<()> {
    let paths = manager.config_paths();
    println!("base_dir: {}", manager.base_dir().display());
    println!("app:      {}", paths.app.display());
    match &paths.user {
        Some(user) => println!("user:     {}", user.display()),
        None => println!("user:     (disabled)"),
    }
    Ok(())
}
