//! Lines - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use lines::{
    cli::{Cli, Commands},
    commands,
    config::{Config, DEFAULT_LOG_LEVEL},
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(cli.verbose, DEFAULT_LOG_LEVEL, false);
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, &config.log_level, !config.local_dev);
    tracing::debug!("Configuration loaded: {:?}", config);

    if config.uses_dev_secret() {
        tracing::warn!("SECRET_KEY is not set; signing tokens with the development key");
    }

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {:?}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber. `RUST_LOG` wins, then `--verbose`, then `LOG_LEVEL`.
///
/// Outside local development every event is a JSON object.
fn init_tracing(verbose: bool, log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { log_level })
    });

    let format = if json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .init();
}
