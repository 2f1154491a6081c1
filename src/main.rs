use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use finlink::core::backtest::BacktestRequest;
use finlink::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Check that the backend is reachable
    Health,
    /// Link a bank account
    Link {
        /// Public token returned by the linking widget; prompted for when omitted
        #[arg(long)]
        public_token: Option<String>,
        /// Institution the account belongs to
        #[arg(long, default_value = "")]
        institution_id: String,
    },
    /// Display recent transactions
    Transactions {
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Display net worth by account
    NetWorth,
    /// Display net worth and recent transactions
    Dashboard,
    /// Run a trading strategy backtest
    Backtest {
        #[arg(long, default_value = "SPY")]
        symbol: String,
        /// First day of the backtest (YYYY-MM-DD)
        #[arg(long, default_value = "2020-01-01")]
        start_date: NaiveDate,
        /// Last day of the backtest (YYYY-MM-DD)
        #[arg(long, default_value = "2023-12-31")]
        end_date: NaiveDate,
        /// Fraction of cash put at risk per trade (0.1 to 1.0)
        #[arg(long, default_value_t = 0.5)]
        cash_at_risk: f64,
    },
    /// Upload a CSV dataset and display its profile
    Profile {
        /// Path to the CSV file
        path: PathBuf,
    },
}

impl From<Commands> for finlink::AppCommand {
    fn from(cmd: Commands) -> finlink::AppCommand {
        match cmd {
            Commands::Health => finlink::AppCommand::Health,
            Commands::Link {
                public_token,
                institution_id,
            } => finlink::AppCommand::Link {
                public_token,
                institution_id,
            },
            Commands::Transactions { limit } => finlink::AppCommand::Transactions { limit },
            Commands::NetWorth => finlink::AppCommand::NetWorth,
            Commands::Dashboard => finlink::AppCommand::Dashboard,
            Commands::Backtest {
                symbol,
                start_date,
                end_date,
                cash_at_risk,
            } => finlink::AppCommand::Backtest(BacktestRequest {
                symbol: symbol.to_uppercase(),
                start_date,
                end_date,
                cash_at_risk,
            }),
            Commands::Profile { path } => finlink::AppCommand::Profile { path },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Setup) => finlink::cli::setup::setup(),
        Some(cmd) => finlink::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    // An interrupted stdin prompt may still be parked on a blocking thread
    runtime.shutdown_background();

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
