use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paradox_machine::{
    cli::{execute_command, Commands},
    config::{ConfigLoader, LogFormat, LoggingConfig},
};

/// Paradox Machine: surface logical paradoxes in a statement with a four-stage LLM pipeline.
#[derive(Parser, Debug)]
#[command(name = "paradox-machine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::from_env();

    // Initialize logging
    init_logging(&LoggingConfig::from_env());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        models_dir = %loader.models_dir().display(),
        "Paradox Machine starting"
    );

    let result = execute_command(cli.command, &loader).await;

    if result.exit_code == 0 {
        if !result.message.is_empty() {
            println!("{}", result.message);
        }
        Ok(())
    } else {
        eprintln!("{}", result.message);
        std::process::exit(result.exit_code);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
