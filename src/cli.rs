use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::config::ConfigCommands;
use crate::commands::resolve::ResolveArgs;

#[derive(Parser)]
#[command(
    name = "resolve-threads",
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve every unresolved review conversation on a pull request
    Resolve(ResolveArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}
