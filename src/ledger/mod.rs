//! Position-accounting engine
//!
//! This module owns the trading rules: per-account cash and stock positions,
//! buy/sell order validation at externally quoted prices, the weighted-average
//! cost basis per symbol and realized P&L on sale.

pub mod engine;
pub mod error;
pub mod types;

// Re-export core types
pub use engine::Ledger;
pub use error::LedgerError;
pub use types::{Account, Position, SaleProceeds, TradeFill};
