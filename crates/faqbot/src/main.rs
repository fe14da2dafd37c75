//! # FAQ Bot CLI (`faqbot`)
//!
//! ## Usage
//!
//! ```bash
//! faqbot --config ./config/faqbot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `faqbot serve` | Start the chat web server |
//! | `faqbot ask "<query>"` | Answer one query and exit |
//! | `faqbot check` | Validate the config and corpus, print a summary |
//!
//! Log verbosity is controlled with `RUST_LOG` (default `faqbot=info,tower_http=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use faqbot::config;
use faqbot::context::AppContext;

/// FAQ Bot: answers questions from a CSV knowledge base.
#[derive(Parser)]
#[command(
    name = "faqbot",
    about = "FAQ Bot: answers questions from a CSV knowledge base",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/faqbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat web server.
    ///
    /// Loads the corpus, embeds it when the matching strategy needs
    /// vectors, then serves `GET`/`POST /`, `POST /api/ask` and
    /// `GET /health` on `[server].bind`.
    Serve,

    /// Answer a single query and print the reply.
    Ask {
        /// The question to ask.
        query: String,
    },

    /// Validate the configuration and corpus without serving.
    Check,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("faqbot=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let ctx = AppContext::init(cfg).await?;
            faqbot::server::run_server(ctx).await?;
        }
        Commands::Ask { query } => {
            faqbot::chat::run_ask(cfg, &query).await?;
        }
        Commands::Check => {
            let corpus = faqbot::corpus::load_corpus(&cfg.corpus.path)?;
            println!("Corpus:      {}", cfg.corpus.path.display());
            println!("Questions:   {}", corpus.len());
            println!("Strategy:    {}", cfg.matching.strategy);
            println!("Embedding:   {}", cfg.embedding.provider);
            println!("Generation:  {}", cfg.generation.provider);
            println!("Bind:        {}", cfg.server.bind);
        }
    }

    Ok(())
}
