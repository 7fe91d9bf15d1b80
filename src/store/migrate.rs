//! Legacy-schema migration
//!
//! Older ledger files used `balance` for `cash`, `portfolio` for `positions`
//! and `avgPrice` for each position's `avgCost`. The rewrite is a pure
//! transform over the raw JSON record so it can be tested without touching
//! disk, and it is idempotent: a record already in the current shape passes
//! through untouched.

use serde_json::{Map, Value};

/// Rewrite one raw account record in place. Returns whether anything changed.
pub fn migrate_account(record: &mut Value) -> bool {
    let Some(fields) = record.as_object_mut() else {
        return false;
    };

    let mut changed = rename_field(fields, "balance", "cash");
    changed |= rename_field(fields, "portfolio", "positions");

    if let Some(Value::Object(positions)) = fields.get_mut("positions") {
        for position in positions.values_mut() {
            if let Some(position) = position.as_object_mut() {
                changed |= rename_field(position, "avgPrice", "avgCost");
            }
        }
    }

    changed
}

fn rename_field(fields: &mut Map<String, Value>, legacy: &str, current: &str) -> bool {
    match fields.remove(legacy) {
        Some(value) => {
            fields.insert(current.to_string(), value);
            true
        }
        None => false,
    }
}
