//! CLI argument definitions using clap
//!
//! Commands:
//! - stashdb inspect <file>
//! - stashdb list --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// stashdb - versioned JSON stores on the local filesystem
#[derive(Parser, Debug)]
#[command(name = "stashdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the envelope header of one persisted store file
    Inspect {
        /// Path to a storage.*.json file
        file: PathBuf,
    },

    /// List every store file in the configured base directory
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./stashdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from(["stashdb", "inspect", "storage.users.json"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect { file } if file == PathBuf::from("storage.users.json")));
    }

    #[test]
    fn test_list_default_config() {
        let cli = Cli::try_parse_from(["stashdb", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List { config } if config == PathBuf::from("./stashdb.json")));
    }
}
