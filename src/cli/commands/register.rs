use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::auth;
use crate::data_paths::DataPaths;
use crate::ledger::types::starting_cash;
use crate::ledger::Ledger;
use crate::store::LedgerStore;

#[derive(Args, Clone)]
pub struct RegisterArgs {
    /// Account identifier
    pub account: String,
}

pub struct RegisterCommand {
    args: RegisterArgs,
}

impl RegisterCommand {
    pub fn new(args: RegisterArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let credential = auth::prompt_credential("Choose a credential: ")?;

        let mut ledger = Ledger::open(LedgerStore::new(&data_paths));
        ledger.register(&self.args.account, &credential)?;

        info!(account = %self.args.account, "account created");
        println!(
            "{}",
            format!(
                "Account {} created with ${:.2} starting cash",
                self.args.account,
                starting_cash()
            )
            .bright_green()
        );
        Ok(())
    }
}
