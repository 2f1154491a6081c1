pub mod cli;
pub mod core;
pub mod providers;

use crate::core::backtest::BacktestRequest;
use crate::core::config::AppConfig;
use crate::providers::BackendClient;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Health,
    Link {
        public_token: Option<String>,
        institution_id: String,
    },
    Transactions {
        limit: Option<usize>,
    },
    NetWorth,
    Dashboard,
    Backtest(BacktestRequest),
    Profile {
        path: PathBuf,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finlink starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let backend = Arc::new(
        BackendClient::from_config(&config.backend).context("Failed to create backend client")?,
    );
    let limit = config.recent_transactions;

    match command {
        AppCommand::Health => {
            let health = backend
                .health()
                .await
                .with_context(|| format!("Backend at {} is unreachable", backend.base_url()))?;
            println!(
                "{}: {}",
                health.status,
                health.message.as_deref().unwrap_or("")
            );
            Ok(())
        }
        AppCommand::Link {
            public_token,
            institution_id,
        } => cli::link::run(backend, &config.user_id, public_token, &institution_id).await,
        AppCommand::Transactions { limit: requested } => {
            cli::transactions::run(backend, requested.unwrap_or(limit), &config.currency).await
        }
        AppCommand::NetWorth => cli::net_worth::run(backend).await,
        AppCommand::Dashboard => cli::dashboard::run(backend, limit, &config.currency).await,
        AppCommand::Backtest(request) => cli::backtest::run(backend.as_ref(), request).await,
        AppCommand::Profile { path } => cli::profile::run(backend.as_ref(), &path).await,
    }
}
