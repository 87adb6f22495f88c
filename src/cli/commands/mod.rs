//! Command handlers for the `breakdown-config` binary.

pub mod config;

use crate::cli::{Cli, Commands};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = config::build_manager(&cli)?;
    match cli.command {
        Commands::Show { json } => config::handle_show(&manager, json).await,
        Commands::Validate => config::handle_validate(&manager).await,
        Commands::Paths => config::handle_paths(&manager),
    }
}
