//! Read-only portfolio valuation
//!
//! Prices every held position through a quote source and aggregates the
//! result. Pure with respect to the ledger: no mutation, no persistence, and
//! it never fails. Symbols without a quote are still listed, with no market
//! data, and left out of the totals.

use futures::future;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Account;
use crate::quotes::QuoteSource;

/// One valued position
#[derive(Debug, Clone, Serialize)]
pub struct PositionRow {
    pub symbol: String,
    pub shares: Decimal,
    pub avg_cost: Decimal,
    /// Quoted price, or `None` when the quote was unavailable.
    pub current_price: Option<Decimal>,
    pub invested: Decimal,
    pub current_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub unrealized_pnl_percent: Option<Decimal>,
}

/// Aggregates over the priced positions
#[derive(Debug, Clone, Serialize)]
pub struct ValuationSummary {
    pub cash: Decimal,
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    /// Cash plus the market value of all priced positions.
    pub total_portfolio_value: Decimal,
    pub overall_pnl: Decimal,
    /// `None` when nothing could be priced.
    pub overall_pnl_percent: Option<Decimal>,
}

/// Full valuation: per-position rows in symbol order plus the summary.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioValuation {
    pub rows: Vec<PositionRow>,
    pub summary: ValuationSummary,
}

/// Value an account's holdings at current quotes.
pub async fn valuate(account: &Account, quotes: &dyn QuoteSource) -> PortfolioValuation {
    // Quote lookups are the only external I/O here and carry no side effects,
    // so they run concurrently.
    let lookups = account.positions.iter().map(|(symbol, position)| async move {
        (symbol.as_str(), position, quotes.quote(symbol).await)
    });
    let priced = future::join_all(lookups).await;

    let mut rows = Vec::with_capacity(priced.len());
    let mut total_invested = Decimal::ZERO;
    let mut total_current_value = Decimal::ZERO;

    for (symbol, position, price) in priced {
        let invested = position.cost_basis();
        let row = match price {
            Some(price) => {
                let current_value = position.shares * price;
                let unrealized_pnl = current_value - invested;
                let unrealized_pnl_percent = if invested.is_zero() {
                    None
                } else {
                    Some(unrealized_pnl / invested * Decimal::from(100))
                };
                total_invested += invested;
                total_current_value += current_value;
                PositionRow {
                    symbol: symbol.to_string(),
                    shares: position.shares,
                    avg_cost: position.avg_cost,
                    current_price: Some(price),
                    invested,
                    current_value: Some(current_value),
                    unrealized_pnl: Some(unrealized_pnl),
                    unrealized_pnl_percent,
                }
            }
            None => PositionRow {
                symbol: symbol.to_string(),
                shares: position.shares,
                avg_cost: position.avg_cost,
                current_price: None,
                invested,
                current_value: None,
                unrealized_pnl: None,
                unrealized_pnl_percent: None,
            },
        };
        rows.push(row);
    }

    let overall_pnl = total_current_value - total_invested;
    let overall_pnl_percent = if total_invested.is_zero() {
        None
    } else {
        Some(overall_pnl / total_invested * Decimal::from(100))
    };

    PortfolioValuation {
        rows,
        summary: ValuationSummary {
            cash: account.cash,
            total_invested,
            total_current_value,
            total_portfolio_value: account.cash + total_current_value,
            overall_pnl,
            overall_pnl_percent,
        },
    }
}
