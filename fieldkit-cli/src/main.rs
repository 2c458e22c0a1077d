use std::process;

use clap::Parser;
use fieldkit_common::ErrorChainExt;
use fieldkit_config::{ConfigProvider, EngineConfig};

mod cli;
mod commands;
mod error;
mod exit_codes;

use cli::Cli;
use commands::CommandEnv;
use error::{handle_cli_result, CliError, CliResult};

fn main() {
    let cli = Cli::parse();

    let loaded = load_config(&cli);
    let filter = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.log.filter.clone());
    configure_logging(cli.verbose, cli.debug, cli.quiet, filter.as_deref());

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load configuration, using defaults\n{}", e.error_chain());
            EngineConfig::default()
        }
    };
    if let Some(root) = &cli.store {
        config.store.root = root.clone();
    }

    let exit_code = match run(&cli, CommandEnv::new(config)) {
        Ok(code) => code,
        Err(e) => handle_cli_result::<()>(Err(e)),
    };
    process::exit(exit_code);
}

fn load_config(cli: &Cli) -> fieldkit_config::ConfigResult<EngineConfig> {
    let mut provider = ConfigProvider::new();
    if let Some(path) = &cli.config {
        provider = provider.with_file(path.clone());
    }
    provider.load()
}

fn run(cli: &Cli, env: CommandEnv) -> CliResult<i32> {
    let outcome = commands::run(&cli.command, &env).map_err(CliError::from)?;
    if let Some(rendered) = outcome.render(cli.format).map_err(CliError::from)? {
        print!("{rendered}");
    }
    tracing::debug!(exit_code = outcome.exit_code, "command finished");
    Ok(outcome.exit_code)
}

/// Install the stderr subscriber.
///
/// Explicit flags win over the configured filter; without either the level is INFO.
fn configure_logging(verbose: bool, debug: bool, quiet: bool, configured: Option<&str>) {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let log_level = if quiet {
        Level::ERROR
    } else if debug {
        Level::DEBUG
    } else if verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    let explicit = quiet || debug || verbose;
    let filter = match configured {
        Some(directives) if !explicit => EnvFilter::new(directives),
        _ => EnvFilter::new(log_level.to_string()),
    };

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
