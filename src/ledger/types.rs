//! Type definitions for the account ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cash granted to every newly registered account.
pub const STARTING_CASH_UNITS: i64 = 100_000;

/// Starting cash as a decimal amount.
pub fn starting_cash() -> Decimal {
    Decimal::from(STARTING_CASH_UNITS)
}

/// A single account in the ledger. The account id is the key of the
/// surrounding store map and is not repeated inside the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque authentication secret. Holds an argon2 PHC string for accounts
    /// registered by this binary; records migrated from the legacy schema may
    /// still carry a plaintext value. Never logged or echoed.
    pub credential: String,

    /// Available cash balance, never negative.
    pub cash: Decimal,

    /// Held positions keyed by uppercase symbol. Every entry has strictly
    /// positive shares; a position sold down to zero is removed.
    pub positions: BTreeMap<String, Position>,
}

impl Account {
    /// Create a fresh account with the fixed starting cash and no positions.
    pub fn new(credential: String) -> Self {
        Self {
            credential,
            cash: starting_cash(),
            positions: BTreeMap::new(),
        }
    }
}

/// A held position in one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Number of shares held, fractional shares permitted.
    pub shares: Decimal,

    /// Weighted-average price paid per currently-held share. Recomputed on
    /// every buy, carried forward unchanged on a sell.
    #[serde(rename = "avgCost")]
    pub avg_cost: Decimal,
}

impl Position {
    /// Total amount invested in the currently-held shares.
    pub fn cost_basis(&self) -> Decimal {
        self.shares * self.avg_cost
    }
}

/// Result of a successful buy order
#[derive(Debug, Clone, Serialize)]
pub struct TradeFill {
    pub symbol: String,
    pub shares: Decimal,
    pub price: Decimal,
    pub total_cost: Decimal,
    pub remaining_cash: Decimal,
}

/// Result of a successful sell order
#[derive(Debug, Clone, Serialize)]
pub struct SaleProceeds {
    pub symbol: String,
    pub shares: Decimal,
    pub price: Decimal,
    pub proceeds: Decimal,
    /// Gain or loss locked in by this sale, against the pre-sale cost basis.
    pub realized_pnl: Decimal,
    /// Realized P&L as a percentage of the cost basis of the sold shares.
    /// `None` when the cost basis is zero.
    pub realized_pnl_percent: Option<Decimal>,
    pub remaining_cash: Decimal,
}
