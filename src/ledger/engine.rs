//! Ledger operations: registration, authentication, buy and sell
//!
//! Every mutating operation is copy-apply-persist-commit: it mutates a cloned
//! account map, saves it atomically, and only installs the new state in memory
//! once the save succeeded. A failed save leaves both memory and disk untouched.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::info;

use crate::auth;
use crate::ledger::error::LedgerError;
use crate::ledger::types::{Account, Position, SaleProceeds, TradeFill};
use crate::store::LedgerStore;

/// The account ledger: loaded accounts plus the store that persists them.
pub struct Ledger {
    store: LedgerStore,
    accounts: BTreeMap<String, Account>,
}

impl Ledger {
    /// Open the ledger, loading whatever the store currently holds.
    pub fn open(store: LedgerStore) -> Self {
        let accounts = store.load();
        Self { store, accounts }
    }

    /// Create a new account with the fixed starting cash and no positions.
    pub fn register(&mut self, id: &str, credential: &str) -> Result<&Account, LedgerError> {
        let id = id.trim();
        if id.is_empty() || credential.is_empty() {
            return Err(LedgerError::InvalidInput(
                "account id and credential must be non-empty".to_string(),
            ));
        }
        if self.accounts.contains_key(id) {
            return Err(LedgerError::DuplicateId(id.to_string()));
        }

        let credential = auth::hash_credential(credential)
            .map_err(|e| LedgerError::Credential(e.to_string()))?;

        let mut next = self.accounts.clone();
        next.insert(id.to_string(), Account::new(credential));
        self.store.save(&next)?;
        self.accounts = next;

        info!(account = %id, "account registered");
        Ok(&self.accounts[id])
    }

    /// Check a credential against the stored one. Read-only.
    pub fn authenticate(&self, id: &str, credential: &str) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.to_string()))?;

        if !auth::verify_credential(&account.credential, credential) {
            return Err(LedgerError::BadCredential);
        }
        Ok(())
    }

    /// Buy shares at the quoted price, debiting cash and updating the
    /// weighted-average cost basis of the position.
    pub fn buy(
        &mut self,
        id: &str,
        symbol: &str,
        shares: Decimal,
        price: Decimal,
    ) -> Result<TradeFill, LedgerError> {
        let symbol = normalize_symbol(symbol)?;
        if shares <= Decimal::ZERO || price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(
                "shares and price must be positive".to_string(),
            ));
        }

        let mut next = self.accounts.clone();
        let account = next
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.to_string()))?;

        let cost = shares * price;
        if cost > account.cash {
            return Err(LedgerError::InsufficientFunds {
                cost,
                cash: account.cash,
            });
        }

        account.cash -= cost;
        match account.positions.get_mut(&symbol) {
            Some(held) => {
                let new_shares = held.shares + shares;
                held.avg_cost = (held.shares * held.avg_cost + shares * price) / new_shares;
                held.shares = new_shares;
            }
            None => {
                account.positions.insert(
                    symbol.clone(),
                    Position {
                        shares,
                        avg_cost: price,
                    },
                );
            }
        }

        let fill = TradeFill {
            symbol,
            shares,
            price,
            total_cost: cost,
            remaining_cash: account.cash,
        };

        self.store.save(&next)?;
        self.accounts = next;

        info!(
            account = %id,
            symbol = %fill.symbol,
            shares = %fill.shares,
            price = %fill.price,
            "buy order filled"
        );
        Ok(fill)
    }

    /// Sell shares at the quoted price, crediting the proceeds and realizing
    /// P&L against the pre-sale cost basis. Selling all held shares removes
    /// the position; the cost basis of any remainder is unchanged.
    pub fn sell(
        &mut self,
        id: &str,
        symbol: &str,
        shares: Decimal,
        price: Decimal,
    ) -> Result<SaleProceeds, LedgerError> {
        let symbol = normalize_symbol(symbol)?;

        let mut next = self.accounts.clone();
        let account = next
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.to_string()))?;
        let held = account
            .positions
            .get_mut(&symbol)
            .ok_or_else(|| LedgerError::NoSuchPosition(symbol.clone()))?;

        if shares <= Decimal::ZERO || price <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(
                "shares and price must be positive".to_string(),
            ));
        }
        if shares > held.shares {
            return Err(LedgerError::InsufficientShares {
                requested: shares,
                held: held.shares,
            });
        }

        let proceeds = shares * price;
        let realized_pnl = (price - held.avg_cost) * shares;
        let cost_basis = held.avg_cost * shares;
        let realized_pnl_percent = if cost_basis.is_zero() {
            None
        } else {
            Some(realized_pnl / cost_basis * Decimal::from(100))
        };

        held.shares -= shares;
        if held.shares.is_zero() {
            account.positions.remove(&symbol);
        }
        account.cash += proceeds;

        let sale = SaleProceeds {
            symbol,
            shares,
            price,
            proceeds,
            realized_pnl,
            realized_pnl_percent,
            remaining_cash: account.cash,
        };

        self.store.save(&next)?;
        self.accounts = next;

        info!(
            account = %id,
            symbol = %sale.symbol,
            shares = %sale.shares,
            price = %sale.price,
            realized_pnl = %sale.realized_pnl,
            "sell order filled"
        );
        Ok(sale)
    }

    /// Look up an account for read-only use (valuation, display).
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String, LedgerError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(LedgerError::InvalidInput(
            "symbol must be non-empty".to_string(),
        ));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_paths::DataPaths;
    use crate::ledger::types::starting_cash;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn open_ledger(dir: &TempDir) -> Ledger {
        let store = LedgerStore::new(&DataPaths::new(dir.path()));
        Ledger::open(store)
    }

    fn ledger_with_account(dir: &TempDir) -> Ledger {
        let mut ledger = open_ledger(dir);
        ledger.register("alice", "hunter2").unwrap();
        ledger
    }

    #[test]
    fn register_creates_account_with_starting_cash() {
        let dir = TempDir::new().unwrap();
        let mut ledger = open_ledger(&dir);

        let account = ledger.register("alice", "hunter2").unwrap();
        assert_eq!(account.cash, starting_cash());
        assert!(account.positions.is_empty());

        // The credential is stored hashed, never verbatim
        assert_ne!(ledger.account("alice").unwrap().credential, "hunter2");
    }

    #[test]
    fn register_rejects_duplicates_and_empty_input() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        assert!(matches!(
            ledger.register("alice", "other"),
            Err(LedgerError::DuplicateId(_))
        ));
        assert!(matches!(
            ledger.register("", "secret"),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            ledger.register("bob", ""),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn authenticate_checks_credential() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_with_account(&dir);

        ledger.authenticate("alice", "hunter2").unwrap();
        assert!(matches!(
            ledger.authenticate("alice", "wrong"),
            Err(LedgerError::BadCredential)
        ));
        assert!(matches!(
            ledger.authenticate("nobody", "hunter2"),
            Err(LedgerError::UnknownAccount(_))
        ));
    }

    #[test]
    fn buy_debits_cash_and_opens_position() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        let fill = ledger.buy("alice", "aapl", dec!(5), dec!(150)).unwrap();
        assert_eq!(fill.symbol, "AAPL");
        assert_eq!(fill.total_cost, dec!(750));
        assert_eq!(fill.remaining_cash, dec!(99250));

        let account = ledger.account("alice").unwrap();
        let position = &account.positions["AAPL"];
        assert_eq!(position.shares, dec!(5));
        assert_eq!(position.avg_cost, dec!(150));
    }

    #[test]
    fn buy_recomputes_weighted_average() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        ledger.buy("alice", "AAPL", dec!(10), dec!(100)).unwrap();
        ledger.buy("alice", "AAPL", dec!(10), dec!(200)).unwrap();

        let position = &ledger.account("alice").unwrap().positions["AAPL"];
        assert_eq!(position.shares, dec!(20));
        assert_eq!(position.avg_cost, dec!(150));
    }

    #[test]
    fn buy_allows_spending_exactly_all_cash() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        let fill = ledger.buy("alice", "AAPL", dec!(1000), dec!(100)).unwrap();
        assert_eq!(fill.remaining_cash, Decimal::ZERO);
    }

    #[test]
    fn buy_rejects_overspend_without_mutation() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        let result = ledger.buy("alice", "AAPL", dec!(1000), dec!(101));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

        let account = ledger.account("alice").unwrap();
        assert_eq!(account.cash, starting_cash());
        assert!(account.positions.is_empty());
    }

    #[test]
    fn buy_validates_inputs() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        assert!(matches!(
            ledger.buy("alice", "  ", dec!(1), dec!(1)),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            ledger.buy("alice", "AAPL", dec!(0), dec!(1)),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            ledger.buy("alice", "AAPL", dec!(1), dec!(-3)),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn sell_realizes_pnl_against_average_cost() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        // The walkthrough scenario: 5 @ 150, 5 @ 170, sell all 10 @ 200
        ledger.buy("alice", "AAPL", dec!(5), dec!(150)).unwrap();
        assert_eq!(ledger.account("alice").unwrap().cash, dec!(99250));

        ledger.buy("alice", "AAPL", dec!(5), dec!(170)).unwrap();
        let account = ledger.account("alice").unwrap();
        assert_eq!(account.cash, dec!(98400));
        assert_eq!(account.positions["AAPL"].avg_cost, dec!(160));

        let sale = ledger.sell("alice", "AAPL", dec!(10), dec!(200)).unwrap();
        assert_eq!(sale.proceeds, dec!(2000));
        assert_eq!(sale.realized_pnl, dec!(400));
        assert_eq!(sale.realized_pnl_percent, Some(dec!(25)));
        assert_eq!(sale.remaining_cash, dec!(100400));

        // Selling exactly all held shares removes the symbol
        assert!(ledger.account("alice").unwrap().positions.is_empty());
    }

    #[test]
    fn partial_sell_keeps_cost_basis() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        ledger.buy("alice", "MSFT", dec!(10), dec!(300)).unwrap();
        ledger.sell("alice", "MSFT", dec!(4), dec!(310)).unwrap();

        let position = &ledger.account("alice").unwrap().positions["MSFT"];
        assert_eq!(position.shares, dec!(6));
        assert_eq!(position.avg_cost, dec!(300));
    }

    #[test]
    fn buy_then_sell_at_same_price_restores_cash() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        ledger.buy("alice", "TSLA", dec!(2.5), dec!(241.3)).unwrap();
        let sale = ledger.sell("alice", "TSLA", dec!(2.5), dec!(241.3)).unwrap();

        assert_eq!(sale.realized_pnl, Decimal::ZERO);
        assert_eq!(ledger.account("alice").unwrap().cash, starting_cash());
    }

    #[test]
    fn sell_rejects_oversell_without_mutation() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        ledger.buy("alice", "AAPL", dec!(5), dec!(150)).unwrap();
        let cash_before = ledger.account("alice").unwrap().cash;

        let result = ledger.sell("alice", "AAPL", dec!(6), dec!(150));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientShares { .. })
        ));

        let account = ledger.account("alice").unwrap();
        assert_eq!(account.cash, cash_before);
        assert_eq!(account.positions["AAPL"].shares, dec!(5));
    }

    #[test]
    fn sell_rejects_unknown_symbol_and_bad_shares() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        assert!(matches!(
            ledger.sell("alice", "AAPL", dec!(1), dec!(100)),
            Err(LedgerError::NoSuchPosition(_))
        ));

        ledger.buy("alice", "AAPL", dec!(5), dec!(150)).unwrap();
        assert!(matches!(
            ledger.sell("alice", "AAPL", dec!(0), dec!(100)),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn invested_amount_matches_cost_basis_across_buys() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ledger_with_account(&dir);

        let buys = [
            (dec!(3), dec!(101.5)),
            (dec!(7), dec!(99.25)),
            (dec!(0.5), dec!(120)),
        ];
        let mut spent = Decimal::ZERO;
        for (shares, price) in buys {
            ledger.buy("alice", "NVDA", shares, price).unwrap();
            spent += shares * price;
        }

        let position = &ledger.account("alice").unwrap().positions["NVDA"];
        assert_eq!(position.cost_basis(), spent);
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut ledger = ledger_with_account(&dir);
            ledger.buy("alice", "AAPL", dec!(5), dec!(150)).unwrap();
        }

        let reopened = open_ledger(&dir);
        let account = reopened.account("alice").unwrap();
        assert_eq!(account.cash, dec!(99250));
        assert_eq!(account.positions["AAPL"].shares, dec!(5));
        reopened.authenticate("alice", "hunter2").unwrap();
    }
}
