pub mod commands;

use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "termfeed")]
#[command(about = "A terminal feed reader with an offline article cache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TERMFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init,

    /// List configured feeds and their filters
    ListFeeds,

    /// Show the articles of a feed, from the cache when fresh
    Articles {
        /// Configured feed name or feed URL
        feed: String,

        /// Only show articles containing this word (repeatable)
        #[arg(short, long)]
        whitelist: Vec<String>,

        /// Hide articles containing this word (repeatable)
        #[arg(short, long)]
        blacklist: Vec<String>,

        /// Ignore all filters
        #[arg(long)]
        raw: bool,

        /// Print the full article bodies
        #[arg(long)]
        full: bool,
    },

    /// Fetch every configured feed whose cache entry is missing or stale
    Sync,

    /// Show what the article cache holds
    Cache,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_file = match &self.config {
            Some(path) => path.clone(),
            None => Config::default_config_file()?,
        };
        let config = Config::load_or_default(&config_file)?;

        // Kept alive so buffered file logs are flushed on exit
        let _log_guard = commands::init_logging(&config.logging, self.debug, self.verbose)?;

        match self.command {
            Commands::Init => commands::init(&config_file),
            Commands::ListFeeds => commands::list_feeds(&config),
            Commands::Articles { feed, whitelist, blacklist, raw, full } => {
                commands::articles(&config, &feed, whitelist, blacklist, raw, full).await
            }
            Commands::Sync => commands::sync(&config).await,
            Commands::Cache => commands::cache_info(&config),
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}
