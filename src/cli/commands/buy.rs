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
pub struct BuyArgs {
    /// Stock symbol (e.g. AAPL, TSLA, MSFT)
    pub symbol: String,

    /// Number of shares to buy (fractional shares allowed)
    #[arg(long)]
    pub shares: Decimal,

    /// Account identifier
    #[arg(long)]
    pub account: String,
}

pub struct BuyCommand {
    args: BuyArgs,
}

impl BuyCommand {
    pub fn new(args: BuyArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, host: &str, data_paths: DataPaths) -> Result<()> {
        let credential = auth::prompt_credential("Credential: ")?;

        let mut ledger = Ledger::open(LedgerStore::new(&data_paths));
        ledger.authenticate(&self.args.account, &credential)?;

        let symbol = self.args.symbol.trim().to_uppercase();
        info!(symbol = %symbol, "looking up quote");

        // An order without a quote is rejected, the account stays untouched
        let quotes = YahooQuoteSource::new(host)?;
        let price = quotes
            .quote(&symbol)
            .await
            .ok_or_else(|| LedgerError::QuoteUnavailable(symbol.clone()))?;

        let fill = ledger.buy(&self.args.account, &symbol, self.args.shares, price)?;

        println!("\n{}", "ORDER FILLED".bright_yellow());
        println!("{}", "─".repeat(40).bright_black());
        println!("{} {}", "Symbol:".bright_white(), fill.symbol);
        println!("{} {}", "Shares:".bright_white(), fill.shares);
        println!("{} ${:.2}", "Price:".bright_white(), fill.price);
        println!("{} ${:.2}", "Total cost:".bright_white(), fill.total_cost);
        println!(
            "{} ${:.2}",
            "Remaining cash:".bright_white(),
            fill.remaining_cash
        );
        Ok(())
    }
}
