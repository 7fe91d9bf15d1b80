//! CLI module for papertrade
//!
//! Command-line interface for the virtual brokerage ledger. It uses clap for
//! argument parsing and provides a structured command pattern for every ledger
//! operation: register, buy, sell and portfolio valuation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{self, LoggingConfig};
use crate::quotes::DEFAULT_QUOTE_HOST;

// Import all command args and commands
use commands::buy::{BuyArgs, BuyCommand};
use commands::portfolio::{PortfolioArgs, PortfolioCommand};
use commands::register::{RegisterArgs, RegisterCommand};
use commands::sell::{SellArgs, SellCommand};

#[derive(Parser)]
#[command(name = "papertrade")]
#[command(version)]
#[command(about = "Virtual brokerage ledger for paper trading", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quote API host
    #[arg(long, global = true, default_value = DEFAULT_QUOTE_HOST)]
    pub quote_host: String,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new account with starting cash
    Register(RegisterArgs),

    /// Buy shares of a symbol at the current market price
    Buy(BuyArgs),

    /// Sell shares of a symbol at the current market price
    Sell(SellArgs),

    /// Show positions, market values and P&L
    Portfolio(PortfolioArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;

        logging::init_logging(LoggingConfig::new(data_paths.clone(), self.verbose > 0))?;

        let host = self.quote_host;
        match self.command {
            Commands::Register(args) => RegisterCommand::new(args).execute(data_paths).await,
            Commands::Buy(args) => BuyCommand::new(args).execute(&host, data_paths).await,
            Commands::Sell(args) => SellCommand::new(args).execute(&host, data_paths).await,
            Commands::Portfolio(args) => PortfolioCommand::new(args).execute(&host, data_paths).await,
        }
    }
}
