use std::sync::Arc;

use clap::Parser;
use services::{CatalogService, Clock, ExamSessionTracker};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;

use cli::Cli;
use config::Config;
use error::AppError;

fn init_tracing(filter: &str) {
    // Logs go to stderr so command output on stdout stays scriptable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.db.clone(), cli.namespace.clone());
    init_tracing(&config.rust_log);
    tracing::debug!(?config, "configuration loaded");

    // Open + migrate SQLite here so core and services stay free of I/O setup.
    config::prepare_sqlite_file(&config.db_url)?;
    let storage = Storage::sqlite(&config.db_url).await?;

    let catalog = CatalogService::new(Arc::clone(&storage.catalog));
    let mut tracker = ExamSessionTracker::restore_in(
        config.namespace.clone(),
        Clock::system(),
        storage.catalog,
        storage.states,
    )
    .await?;

    let mut stdout = std::io::stdout().lock();
    commands::execute(cli.command, &catalog, &mut tracker, &mut stdout).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
