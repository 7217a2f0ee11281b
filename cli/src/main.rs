use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};
use config::{load_config, merge_config};
use error::{CliResult, to_exit_code};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = if cli.verbose {
        "tether=debug,tether_cli=debug"
    } else {
        "tether=warn,tether_cli=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async_main(cli));
    to_exit_code(result)
}

async fn async_main(cli: Cli) -> CliResult<()> {
    let file_config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            let config = merge_config(file_config, &args.common)?;
            commands::serve::execute(config).await
        }
        Commands::Call(args) => {
            let config = merge_config(file_config, &args.common)?;
            commands::call::execute(args, config).await
        }
        Commands::Channels => {
            commands::channels::execute();
            Ok(())
        }
    }
}
