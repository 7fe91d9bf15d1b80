//! Portfolio CLI command: valuate holdings at current quotes and display them

use anyhow::{anyhow, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::auth;
use crate::data_paths::DataPaths;
use crate::ledger::Ledger;
use crate::quotes::YahooQuoteSource;
use crate::store::LedgerStore;
use crate::valuation::valuate;

#[derive(Args, Clone)]
pub struct PortfolioArgs {
    /// Account identifier
    #[arg(long)]
    pub account: String,
}

pub struct PortfolioCommand {
    args: PortfolioArgs,
}

impl PortfolioCommand {
    pub fn new(args: PortfolioArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, host: &str, data_paths: DataPaths) -> Result<()> {
        let credential = auth::prompt_credential("Credential: ")?;

        let ledger = Ledger::open(LedgerStore::new(&data_paths));
        ledger.authenticate(&self.args.account, &credential)?;
        let account = ledger
            .account(&self.args.account)
            .ok_or_else(|| anyhow!("account not found: {}", self.args.account))?;

        let quotes = YahooQuoteSource::new(host)?;
        let valuation = valuate(account, &quotes).await;

        println!(
            "\n{}",
            format!("{}'S PORTFOLIO", self.args.account.to_uppercase()).bright_yellow()
        );
        println!("{}", "─".repeat(60).bright_black());
        println!(
            "{} ${:.2}",
            "Available cash:".bright_white(),
            valuation.summary.cash
        );

        if valuation.rows.is_empty() {
            println!("\n{}", "No positions held yet".bright_black().italic());
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Symbol",
                "Shares",
                "Avg Cost",
                "Price",
                "Value",
                "Unrealized P&L",
            ]);

        for row in &valuation.rows {
            let price_display = match row.current_price {
                Some(price) => format!("${:.2}", price),
                None => "N/A".to_string(),
            };
            let value_display = match row.current_value {
                Some(value) => format!("${:.2}", value),
                None => "N/A".to_string(),
            };
            let pnl_display = match (row.unrealized_pnl, row.unrealized_pnl_percent) {
                (Some(pnl), Some(percent)) => {
                    let sign = if pnl >= Decimal::ZERO { "+" } else { "" };
                    let text = format!("{}{:.2} ({}{:.1}%)", sign, pnl, sign, percent);
                    if pnl >= Decimal::ZERO {
                        text.bright_green().to_string()
                    } else {
                        text.bright_red().to_string()
                    }
                }
                _ => "N/A".to_string(),
            };

            table.add_row(vec![
                row.symbol.clone(),
                format!("{:.2}", row.shares),
                format!("${:.2}", row.avg_cost),
                price_display,
                value_display,
                pnl_display,
            ]);
        }

        println!("{}", table);

        let summary = &valuation.summary;
        println!("\n{}", "PORTFOLIO SUMMARY".bright_yellow());
        println!("{}", "─".repeat(60).bright_black());
        println!(
            "{} ${:.2}",
            "Total invested:".bright_white(),
            summary.total_invested
        );
        println!(
            "{} ${:.2}",
            "Total stock value:".bright_white(),
            summary.total_current_value
        );
        println!(
            "{} ${:.2}",
            "Total portfolio value:".bright_white(),
            summary.total_portfolio_value
        );

        if let Some(percent) = summary.overall_pnl_percent {
            let sign = if summary.overall_pnl >= Decimal::ZERO {
                "+"
            } else {
                ""
            };
            let line = format!("{}{:.2} ({}{:.1}%)", sign, summary.overall_pnl, sign, percent);
            if summary.overall_pnl >= Decimal::ZERO {
                println!("{} {}", "Overall P&L:".bright_white(), line.bright_green());
            } else {
                println!("{} {}", "Overall P&L:".bright_white(), line.bright_red());
            }
        }
        Ok(())
    }
}
