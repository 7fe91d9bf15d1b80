use rust_decimal::Decimal;

use crate::store::StoreError;

/// Errors surfaced by ledger operations. Failed operations leave the account
/// unmodified and unsaved.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("account id already taken: {0}")]
    DuplicateId(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("incorrect credential")]
    BadCredential,

    #[error("no position held in {0}")]
    NoSuchPosition(String),

    #[error("cannot sell {requested} shares, only {held} held")]
    InsufficientShares { requested: Decimal, held: Decimal },

    #[error("order costs {cost} but only {cash} cash is available")]
    InsufficientFunds { cost: Decimal, cash: Decimal },

    #[error("no quote available for {0}")]
    QuoteUnavailable(String),

    #[error("credential processing failed: {0}")]
    Credential(String),

    #[error("ledger store error: {0}")]
    Store(#[from] StoreError),
}
