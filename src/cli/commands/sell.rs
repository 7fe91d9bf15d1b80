use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use tracing::info;

use crate::auth;
use crate::data_paths::DataPaths;
use crate::ledger::{Ledger, LedgerError};
use crate::quotes::{QuoteSource, YahooQuoteSource};
use crate::store::LedgerStore;

#[derive(Args, Clone)]
pub struct SellArgs {
    /// Stock symbol to sell
    pub symbol: String,

    /// Number of shares to sell
    #[arg(long)]
    pub shares: Decimal,

    /// Account identifier
    #[arg(long)]
    pub account: String,
}

pub struct SellCommand {
    args: SellArgs,
}

impl SellCommand {
    pub fn new(args: SellArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, host: &str, data_paths: DataPaths) -> Result<()> {
        let credential = auth::prompt_credential("Credential: ")?;

        let mut ledger = Ledger::open(LedgerStore::new(&data_paths));
        ledger.authenticate(&self.args.account, &credential)?;

        let symbol = self.args.symbol.trim().to_uppercase();
        info!(symbol = %symbol, "looking up quote");

        let quotes = YahooQuoteSource::new(host)?;
        let price = quotes
            .quote(&symbol)
            .await
            .ok_or_else(|| LedgerError::QuoteUnavailable(symbol.clone()))?;

        let sale = ledger.sell(&self.args.account, &symbol, self.args.shares, price)?;

        println!("\n{}", "SALE COMPLETE".bright_yellow());
        println!("{}", "─".repeat(40).bright_black());
        println!("{} {}", "Symbol:".bright_white(), sale.symbol);
        println!("{} {}", "Shares:".bright_white(), sale.shares);
        println!("{} ${:.2}", "Price:".bright_white(), sale.price);
        println!("{} ${:.2}", "Proceeds:".bright_white(), sale.proceeds);

        let percent = match sale.realized_pnl_percent {
            Some(percent) => format!("{:.1}%", percent),
            None => "N/A".to_string(),
        };
        let sign = if sale.realized_pnl >= Decimal::ZERO {
            "+"
        } else {
            ""
        };
        let pnl_line = format!("{}{:.2} ({}{})", sign, sale.realized_pnl, sign, percent);
        if sale.realized_pnl >= Decimal::ZERO {
            println!(
                "{} {}",
                "Realized P&L:".bright_white(),
                pnl_line.bright_green()
            );
        } else {
            println!(
                "{} {}",
                "Realized P&L:".bright_white(),
                pnl_line.bright_red()
            );
        }
        println!(
            "{} ${:.2}",
            "New cash balance:".bright_white(),
            sale.remaining_cash
        );
        Ok(())
    }
}
