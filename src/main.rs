#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod cli;
mod scenarios;

use anyhow::Context;
use cli::{parse_cli_args, CliAction, USAGE};
use railway::config::load_config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, scenario) = match parse_cli_args(&args) {
        Ok(CliAction::ShowHelp) => {
            println!("{USAGE}");
            return Ok(());
        }
        Ok(CliAction::Run { config, scenario }) => (config, scenario),
        Err(error) => {
            eprintln!("{error}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = load_config(config_path)
        .await
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(?scenario, max_concurrency = config.max_concurrency, "running scenario");
    scenarios::run(scenario, &config).await
}
