//! OpenHeaders - Main Entry Point
//!
//! Command-line front end over the persisted profile state: edit profiles,
//! preview the declarative rule for a set of tabs, and import or export
//! profile files.

mod cli;
mod commands;
mod session;

use clap::Parser;
use openheaders_infrastructure::RuntimeConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = RuntimeConfig::from_env_with_state_dir(cli.state_dir.clone())?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        state_dir = %config.state_dir.display(),
        "starting OpenHeaders v{}",
        env!("CARGO_PKG_VERSION")
    );

    commands::run(cli.command, &config).await
}
