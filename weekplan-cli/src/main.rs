mod cli;
mod commands;
mod config;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::PlannerConfig;
use tracing_subscriber::EnvFilter;
use weekplan::{spawn_scheduler, FileStorage, Planner, SaveStatus, TerminalBell};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env.weekplan
    dotenvy::from_filename(".env.weekplan").ok();

    let cli = Cli::parse();
    if let Commands::ConfigPath = cli.command {
        return commands::config_path();
    }

    let config = PlannerConfig::load()?;
    init_tracing(&config.log_level);

    let data_dir = config.data_dir()?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");
    let storage = Arc::new(FileStorage::new(&data_dir));

    let mut planner = Planner::load(storage.as_ref(), local_today())
        .with_context(|| format!("Failed to load planner data from {}", data_dir.display()))?
        .with_feedback(TerminalBell)
        .with_daily_capacity(config.daily_capacity_minutes);

    let (saver, task) = spawn_scheduler(storage, config.save_debounce());
    planner.attach_saver(saver.clone());
    planner.set_week_offset(cli.offset);

    let result = commands::run(&mut planner, cli.command, &config);

    saver.flush().await;
    let status = saver.status();
    drop(planner);
    drop(saver);
    task.await.context("Persistence task failed")?;

    if status == SaveStatus::Failed {
        bail!("Could not save planner data to {}", data_dir.display());
    }
    result
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn local_today() -> time::Date {
    time::OffsetDateTime::now_utc()
        .to_offset(time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC))
        .date()
}
