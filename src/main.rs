use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use p2p_rates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the consensus USDT rate for one or more currencies
    Rate {
        /// Currency codes, e.g. NGN KES
        #[arg(required = true)]
        currencies: Vec<String>,

        /// Also list the quote from every queried source
        #[arg(short, long)]
        sources: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => p2p_rates::cli::setup::setup(),
        Some(Commands::Rate {
            currencies,
            sources,
        }) => {
            let command = p2p_rates::AppCommand::Rate {
                currencies,
                show_sources: sources,
            };
            p2p_rates::run_command(command, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
