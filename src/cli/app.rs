use std::path::PathBuf;

use clap::Parser;

/// Resolve and inspect layered breakdown configuration
#[derive(Parser, Debug)]
#[command(name = "breakdown-config", author, version, about, long_about = None)]
pub struct Cli {
    /// Project base directory (defaults to BREAKDOWN_BASE_DIR or the current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Profile prefix selecting <prefix>-app.yml and <prefix>-user.yml
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Explicit app config file
    #[arg(long, global = true)]
    pub app_config: Option<PathBuf>,

    /// Explicit user config file
    #[arg(long, global = true, conflicts_with = "no_user_config")]
    pub user_config: Option<PathBuf>,

    /// Ignore the user config layer
    #[arg(long, global = true)]
    pub no_user_config: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the merged configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the app and user configuration
    Validate,
    /// Print the resolved config file locations
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["breakdown-config"]).is_err());
    }

    #[test]
    fn test_cli_help_flag_exits_with_help_error() {
        let result = Cli::try_parse_from(["breakdown-config", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_command_defaults() {
        let cli = Cli::try_parse_from(["breakdown-config", "show"]).unwrap();
        assert_eq!(cli.command, Commands::Show { json: false });
        assert!(cli.base_dir.is_none());
        assert!(cli.profile.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_show_command_with_json() {
        let cli = Cli::try_parse_from(["breakdown-config", "show", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Show { json: true });
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "breakdown-config",
            "validate",
            "--base-dir",
            "/project",
            "--profile",
            "production",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::Validate);
        assert_eq!(cli.base_dir, Some(PathBuf::from("/project")));
        assert_eq!(cli.profile.as_deref(), Some("production"));
        assert!(cli.debug);
    }

    #[test]
    fn test_explicit_config_paths() {
        let cli = Cli::try_parse_from([
            "breakdown-config",
            "--app-config",
            "conf/app.yml",
            "--user-config",
            "conf/user.yml",
            "paths",
        ])
        .unwrap();
        assert_eq!(cli.app_config, Some(PathBuf::from("conf/app.yml")));
        assert_eq!(cli.user_config, Some(PathBuf::from("conf/user.yml")));
    }

    #[test]
    fn test_user_config_conflicts_with_no_user_config() {
        let result = Cli::try_parse_from([
            "breakdown-config",
            "--user-config",
            "u.yml",
            "--no-user-config",
            "show",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_command_fails() {
        assert!(Cli::try_parse_from(["breakdown-config", "invalid"]).is_err());
    }
}
