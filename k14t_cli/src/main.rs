//! K-14T - a terse droid persona chatting through a local model, with long-term fact memory.
//!
//! ## Commands
//!
//! - `chat`: Interactive loop (default)
//! - `remember`: Store a fact
//! - `list`: Show remembered facts with their positions
//! - `forget`: Delete a fact by position
//! - `wipe`: Delete every fact
//! - `recall`: Show the facts that would be injected for a query

mod ollama;
mod repl;
mod telemetry;
mod voice;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use k14t_rules::{LoopConfig, DEFAULT_CONFIG_PATH};
use memory_core::{AddOutcome, FactStore, StoreConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};

use crate::ollama::OllamaClient;
use crate::repl::ChatLoop;

#[derive(Parser)]
#[command(name = "k14t")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "K-14T chat loop with long-term fact memory", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, env = "K14T_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured model for this run
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to K-14T interactively
    Chat,

    /// Remember a fact
    Remember {
        /// Fact text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List remembered facts, oldest first
    List {
        /// Show at most this many of the most recent facts
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },

    /// Forget the fact at a listed position
    Forget {
        /// Position as shown by `list`
        index: usize,
    },

    /// Forget every fact
    Wipe,

    /// Show which facts would be injected for a query
    Recall {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,

        /// Number of facts to select (default: memory_max_injected)
        #[arg(short)]
        k: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json, level);

    let config = LoopConfig::load_or_default(&cli.config);
    let mut store = open_store(&config)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let client = OllamaClient::new(&config.endpoint)?;
            info!(endpoint = %config.endpoint, "waiting for inference server");
            if !client.wait_for_server(Duration::from_secs(config.server_wait_secs)) {
                bail!("inference server not reachable at {}", config.endpoint);
            }

            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            ChatLoop::new(config, cli.config, cli.model, store, client)
                .run(stdin.lock(), &mut stdout)?;
        }

        Commands::Remember { text } => {
            let text = text.join(" ");
            match store.add(&text)? {
                AddOutcome::Stored => println!("Stored: {}", text.trim()),
                AddOutcome::Duplicate => println!("Duplicate: {}", text.trim()),
                AddOutcome::Empty => bail!("nothing to remember"),
            }
        }

        Commands::List { limit } => {
            let shown = store.list_recent(limit);
            if shown.is_empty() {
                println!("(no facts)");
            }
            let offset = store.len() - shown.len();
            for (i, fact) in shown.iter().enumerate() {
                let category = fact.category.map(|c| format!(" ({c})")).unwrap_or_default();
                println!("[{}] {}{}", offset + i, fact.text, category);
            }
        }

        Commands::Forget { index } => {
            if store.delete_by_position(index)? {
                println!("Deleted fact {index}.");
            } else {
                bail!("no fact at position {index} ({} stored)", store.len());
            }
        }

        Commands::Wipe => {
            store.clear_all()?;
            println!("Memory wiped.");
        }

        Commands::Recall { query, k } => {
            let query = query.join(" ");
            let k = k.unwrap_or(config.memory_max_injected);
            for fact in store.select_relevant(&query, k) {
                println!("- {}", fact.text);
            }
        }
    }

    Ok(())
}

fn open_store(config: &LoopConfig) -> Result<FactStore> {
    let store_config = StoreConfig {
        max_facts: config.memory_max_facts,
        ..StoreConfig::default()
    };
    FactStore::open_with(&config.memory_path, store_config)
        .with_context(|| format!("failed to open memory log {}", config.memory_path.display()))
}
