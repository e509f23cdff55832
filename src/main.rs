mod cli;
mod commands;
mod infra;
mod shared;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { verbose, command } = Cli::parse();
    shared::logging::init(verbose);

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Resolve(args) => {
            let config = shared::config::load_config()?;
            args.run(&config).await?;
        }
        Commands::Config(config_cmd) => config_cmd.run()?,
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "resolve-threads",
                &mut std::io::stdout(),
            );
        }
    }
    Ok(())
}
