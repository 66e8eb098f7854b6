//! FinSight CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Conversational mode (interactive or single message)
//! - `ask`: One-off knowledge base question with citations (JSON)
//! - `tools`: List the investment tools
//! - `config`: Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "finsight",
    about = "FinSight, retrieval-augmented investment assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the investment assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session id to continue (a new one is generated if omitted)
        #[arg(short, long, env = "FINSIGHT_SESSION")]
        session: Option<String>,
    },

    /// Ask the knowledge base one question and print the cited answer
    Ask {
        /// The question
        query: String,

        /// Session id used for log correlation
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List the available investment tools
    Tools,

    /// Show the effective configuration (secrets redacted)
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    match cli.command {
        Commands::Chat { message, session } => commands::chat::run(message, session).await?,
        Commands::Ask { query, session } => commands::ask::run(query, session).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Config { path } => {
            if path {
                commands::config_cmd::path()?
            } else {
                commands::config_cmd::show()?
            }
        }
    }

    Ok(())
}
