//! CLI interface to administer Warden.
use clap::Parser;
use clap::Subcommand;

pub mod entity;
pub mod group;
pub mod store;
pub mod token;

use crate::logging::LogOpt;

/// Administer Warden identities, groups and tokens.
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the Warden configuration to use.
    #[arg(short = 'c', long = "config", global = true, default_value_t = String::from("warden.yaml"))]
    pub config: String,

    /// Select the `wardenctl` command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Configure process logging.
    #[command(flatten)]
    pub log: LogOpt,

    /// Write collected metrics, in Prometheus text format, to this file on exit.
    #[arg(long = "metrics-file", global = true)]
    pub metrics_file: Option<String>,
}

/// Select the `wardenctl` command to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect, delete or manipulate entities and their aliases.
    Entity(entity::EntityCli),

    /// Inspect, delete or manipulate groups and group aliases.
    Group(group::GroupCli),

    /// Manage the persistent store.
    Store(store::StoreCli),

    /// Issue, inspect, renew and revoke tokens.
    Token(token::TokenCli),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::Parser;

    use super::Cli;
    use super::Command;

    #[test]
    fn clap_integrity_check() {
        let command = Cli::command();
        command.debug_assert();
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::try_parse_from(["wardenctl", "store", "sync"]).unwrap();
        assert_eq!(cli.config, "warden.yaml");
        assert!(matches!(cli.command, Command::Store(_)));
        assert!(cli.metrics_file.is_none());
    }

    #[test]
    fn metrics_file_after_command() {
        let argv = ["wardenctl", "token", "revoke", "t1", "--metrics-file", "metrics.txt"];
        let cli = Cli::try_parse_from(argv).unwrap();
        assert_eq!(cli.metrics_file.as_deref(), Some("metrics.txt"));
    }
}
