//! quizrun CLI — take timed quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Settings;

#[derive(Parser)]
#[command(name = "quizrun", version, about = "Timed multiple-choice quizzes with autosave and resume")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved progress (overrides the config file)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz generated for a document
    Take {
        /// Document (source) id
        #[arg(long)]
        source: String,
    },

    /// Take the built-in demo quiz offline
    Demo,

    /// Show past attempts recorded by the server
    History,

    /// Inspect or erase saved progress for a quiz
    Progress {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// Erase the saved progress
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizrun=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match Settings::load(cli.config.as_deref(), cli.storage_dir) {
        Ok(settings) => match cli.command {
            Commands::Take { source } => commands::take::execute(source, settings).await,
            Commands::Demo => commands::demo::execute(settings).await,
            Commands::History => commands::history::execute(settings).await,
            Commands::Progress { quiz, clear } => commands::progress::execute(quiz, clear, settings),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
