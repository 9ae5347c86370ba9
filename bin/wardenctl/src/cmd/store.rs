//! Manage the persistent store.
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;

use warden_store::StoreFactorySyncArgs;

use crate::Globals;

/// Manage the persistent store.
#[derive(Debug, Parser)]
pub struct StoreCli {
    /// Select the `wardenctl store` command to run.
    #[command(subcommand)]
    pub command: StoreCmd,
}

/// Possible store commands to run.
#[derive(Debug, Subcommand)]
pub enum StoreCmd {
    /// Initialise or migrate the persistent store schema.
    #[command(alias = "migrate")]
    Sync,
}

/// Execute the selected `wardenctl store` command.
pub async fn run(globals: &Globals, cmd: &StoreCli) -> Result<i32> {
    match cmd.command {
        StoreCmd::Sync => sync(globals).await,
    }
}

async fn sync(globals: &Globals) -> Result<i32> {
    let args = StoreFactorySyncArgs {
        conf: &globals.conf.store.options,
        context: &globals.context,
    };
    globals
        .backends
        .store(&globals.conf.store.backend)?
        .sync(args)
        .await?;
    println!("Persistent store is up to date.");
    Ok(0)
}
