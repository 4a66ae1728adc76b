//! My Vote command-line entry point

use clap::{Args as ClapArgs, Parser, Subcommand};
use myvote::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// My Vote: voter-register search and assistant
#[derive(Parser, Debug)]
#[command(name = "myvote")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// Who the query runs as.
#[derive(ClapArgs, Debug, Clone)]
pub struct ScopeArgs {
    /// Caller role (admin or ward_member)
    #[arg(long, default_value = "admin")]
    role: String,
    /// Assigned ward ID (required for ward_member)
    #[arg(long)]
    ward: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transliterate Malayalam text to Manglish
    Transliterate {
        /// Text to transliterate
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Search the voter list
    Search {
        /// Search term (Malayalam, Manglish or English)
        term: String,
        /// Restrict to one booth
        #[arg(short, long)]
        booth: Option<String>,
        /// Also match model-suggested spelling variants
        #[arg(short, long)]
        expand: bool,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Parse a question into a query descriptor
    Parse {
        /// Question text
        question: String,
    },
    /// Ask the assistant a question
    Ask {
        /// Question text
        question: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Suggest spelling variants for a name
    Variants {
        /// Name as typed
        name: String,
    },
    /// Check an API key (defaults to the configured key)
    CheckKey {
        /// Key to check
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Transliteration needs no configuration
    if let Command::Transliterate { text } = &args.command {
        cli::run_transliterate(&text.join(" "), args.json);
        return Ok(());
    }

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    match args.command {
        Command::Transliterate { .. } => Ok(()),
        Command::Search {
            term,
            booth,
            expand,
            scope,
        } => {
            cli::run_search(&config, &term, booth, expand, &scope.role, scope.ward, args.json).await
        }
        Command::Parse { question } => cli::run_parse(&config, &question, args.json).await,
        Command::Ask { question, scope } => {
            cli::run_ask(&config, &question, &scope.role, scope.ward, args.json).await
        }
        Command::Variants { name } => cli::run_variants(&config, &name, args.json).await,
        Command::CheckKey { key } => cli::run_check_key(&config, key, args.json).await,
    }
}
