//! Durable storage for the account ledger
//!
//! The whole store is one JSON document mapping account id to account record,
//! kept at `<data>/ledger/accounts.json`. Saves are atomic: the new content is
//! written to a temporary file and renamed over the target, so an interrupted
//! process leaves either the old or the new complete file, never a torn one.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::data_paths::DataPaths;
use crate::ledger::Account;

pub mod migrate;

/// Ledger store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// File-backed store for the account map
pub struct LedgerStore {
    ledger_path: PathBuf,
}

impl LedgerStore {
    pub fn new(data_paths: &DataPaths) -> Self {
        Self {
            ledger_path: data_paths.ledger().join("accounts.json"),
        }
    }

    /// Load the persisted accounts. Any load failure degrades to an empty
    /// store: availability is preferred over surfacing corruption, and the
    /// cause is logged so operators can still see it.
    pub fn load(&self) -> BTreeMap<String, Account> {
        match self.try_load() {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("ledger store unreadable, starting with an empty store: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Narrow reader behind [`load`]: reads the file, rewrites legacy-schema
    /// records to the current field names, and persists the migrated form
    /// back immediately so the migration runs at most once.
    pub fn try_load(&self) -> Result<BTreeMap<String, Account>, StoreError> {
        if !self.ledger_path.exists() {
            debug!("no ledger file at {:?}, starting empty", self.ledger_path);
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.ledger_path)?;
        let mut raw: Value = serde_json::from_str(&content)?;

        let mut migrated = false;
        if let Value::Object(records) = &mut raw {
            for record in records.values_mut() {
                migrated |= migrate::migrate_account(record);
            }
        }

        let accounts: BTreeMap<String, Account> = serde_json::from_value(raw)?;

        if migrated {
            info!("rewrote legacy ledger records to the current schema");
            if let Err(e) = self.save(&accounts) {
                warn!("failed to persist migrated ledger, will retry next load: {}", e);
            }
        }

        Ok(accounts)
    }

    /// Durably replace the whole store with the given account map.
    pub fn save(&self, accounts: &BTreeMap<String, Account>) -> Result<(), StoreError> {
        if let Some(parent) = self.ledger_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(accounts)?;

        // Write to temporary file first
        let temp_path = self.ledger_path.with_extension("tmp");
        fs::write(&temp_path, json)?;

        // Rename to final path (atomic operation)
        fs::rename(&temp_path, &self.ledger_path)?;

        debug!("saved ledger with {} accounts", accounts.len());
        Ok(())
    }
}
