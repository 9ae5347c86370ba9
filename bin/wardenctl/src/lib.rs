//! Administer Warden entities, groups and tokens from a Command Line Interface.
use anyhow::Result;
use clap::Parser;

mod backends;
mod cmd;
mod globals;
mod logging;
mod output;

pub use self::backends::BackendNotFound;
pub use self::cmd::Cli;

use self::globals::Globals;

/// Initialise the wardenctl process and invoke a command implementation.
pub async fn execute(cli: Cli) -> Result<i32> {
    let globals = Globals::initialise(cli).await?;
    let result = match &globals.cli.command {
        cmd::Command::Entity(cmd) => cmd::entity::run(&globals, cmd).await,
        cmd::Command::Group(cmd) => cmd::group::run(&globals, cmd).await,
        cmd::Command::Store(cmd) => cmd::store::run(&globals, cmd).await,
        cmd::Command::Token(cmd) => cmd::token::run(&globals, cmd).await,
    };
    if let Some(path) = &globals.cli.metrics_file {
        output::metrics(path, &globals.metrics)?;
    }
    result
}

/// Initialise the async runtime for the process and invoke [`execute`].
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(execute(cli))
}
