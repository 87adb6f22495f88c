use std::process::ExitCode;

use breakdown_config::cli::{Cli, commands};
use breakdown_config::error::ConfigError;
use breakdown_config::telemetry::{TracingConfig, init_tracing};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _tracing_guard = match init_tracing(&TracingConfig::from_env(cli.debug)) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: {err}");
            None
        }
    };

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ConfigError>() {
        Some(config_err) => eprintln!("{}: {config_err}", config_err.kind()),
        None => eprintln!("error: {err:#}"),
    }
}
