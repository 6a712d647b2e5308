use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::Cli;
use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use crate::feed::fetcher::FeedFetcher;
use crate::feed::{Article, Feed};
use crate::storage::{Cache, PersistentCache};

const SUMMARY_WIDTH: usize = 120;

/// Write a default configuration file, refusing to overwrite an existing one.
pub fn init(config_file: &Path) -> Result<()> {
    if config_file.exists() {
        return Err(Error::AlreadyExists(format!(
            "Configuration file already exists: {}",
            config_file.display()
        )));
    }

    let config = Config::default();
    config.save(config_file)?;
    info!("Created default configuration: {}", config_file.display());

    println!("✅ termfeed initialized!");
    println!("   Config file: {}", config_file.display());
    if let Ok(cache_path) = config.cache_path() {
        println!("   Cache file:  {}", cache_path.display());
    }
    println!();
    println!("Add feeds to the config file:");
    println!("   [[feeds]]");
    println!("   name = \"Rust Blog\"");
    println!("   url = \"https://blog.rust-lang.org/feed.xml\"");
    println!("   blacklist_words = [\"sponsored\"]");

    Ok(())
}

pub fn list_feeds(config: &Config) -> Result<()> {
    if config.feeds.is_empty() {
        println!("📋 No feeds configured yet.");
        return Ok(());
    }

    println!("📋 Configured feeds:");
    for feed in &config.feeds {
        println!("\n📰 {}", feed.name);
        println!("   URL: {}", feed.url);
        if !feed.whitelist_words.is_empty() {
            println!("   Whitelist: {}", feed.whitelist_words.join(", "));
        }
        if !feed.blacklist_words.is_empty() {
            println!("   Blacklist: {}", feed.blacklist_words.join(", "));
        }
    }

    Ok(())
}

/// Show one feed's articles through the cache.
pub async fn articles(
    config: &Config,
    feed_arg: &str,
    whitelist: Vec<String>,
    blacklist: Vec<String>,
    raw: bool,
    full: bool,
) -> Result<()> {
    let mut feed = resolve_feed(config, feed_arg)?;
    feed.whitelist_words.extend(whitelist);
    feed.blacklist_words.extend(blacklist);

    let cache = open_cache(config)?;
    let result = cache.get_articles(&feed, !raw).await;

    // Whatever was fetched is worth keeping even if this lookup failed
    if let Err(e) = cache.save() {
        warn!("Failed to save cache: {}", e);
    }

    let articles = result?;
    print_articles(&feed, &articles, full);
    Ok(())
}

/// Bring every configured feed into the cache concurrently.
pub async fn sync(config: &Config) -> Result<()> {
    if config.feeds.is_empty() {
        println!("📋 No feeds configured yet.");
        return Ok(());
    }

    let cache = open_cache(config)?;
    let lookups = config.feeds.iter().map(|feed| {
        let cache = &cache;
        async move { (feed, cache.get_articles(feed, true).await) }
    });
    let results = futures::future::join_all(lookups).await;

    let mut failures = 0;
    for (feed, result) in &results {
        match result {
            Ok(articles) => println!("✅ {} ({} articles)", feed.name, articles.len()),
            Err(e) => {
                failures += 1;
                println!("❌ {}: {}", feed.name, e);
            }
        }
    }

    cache.save()?;

    let stats = cache.stats();
    println!(
        "\n📊 {} feeds, {} served from cache, {} fetched, {} failed",
        results.len(),
        stats.hits,
        stats.refreshes,
        failures
    );

    Ok(())
}

/// Describe the cache file and every entry in it.
pub fn cache_info(config: &Config) -> Result<()> {
    let path = config.cache_path()?;
    let persistence = PersistentCache::new(&path);
    let mut entries: Vec<_> = persistence.load()?.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    println!("💾 Cache file: {}", path.display());
    println!("   Size: {} bytes", persistence.cache_size_bytes());
    println!("   Entry lifetime: {} seconds", config.cache.duration);

    if entries.is_empty() {
        println!("   (empty)");
        return Ok(());
    }

    let now = Utc::now();
    for (url, entry) in entries {
        let status = if entry.is_fresh_at(now) { "fresh" } else { "stale" };
        println!(
            "\n   {}\n      {} articles, expires {} ({})",
            url,
            entry.articles.len(),
            entry.expire.format("%Y-%m-%d %H:%M:%S UTC"),
            status
        );
    }

    Ok(())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Build the cache for `config` and restore it from disk.
fn open_cache(config: &Config) -> Result<Cache> {
    let fetcher = FeedFetcher::new(&config.fetch)?;
    let cache = Cache::new(config.cache_path()?, Arc::new(fetcher))
        .with_cache_duration(config.cache_duration()?);

    // A corrupt file aborts here so it is not overwritten by the next save
    cache.load()?;
    debug!("Opened cache at {} with {} feeds", cache.storage_path().display(), cache.len());
    Ok(cache)
}

/// A configured feed by name, or an unfiltered feed for a URL.
fn resolve_feed(config: &Config, feed_arg: &str) -> Result<Feed> {
    if let Some(feed) = config.find_feed(feed_arg) {
        return Ok(feed.clone());
    }

    match url::Url::parse(feed_arg) {
        Ok(_) => Ok(Feed::new(feed_arg)),
        Err(_) => Err(Error::NotFound(format!(
            "'{}' is neither a configured feed nor a URL",
            feed_arg
        ))),
    }
}

fn print_articles(feed: &Feed, articles: &[Article], full: bool) {
    println!("📰 {} ({} articles)", feed.name, articles.len());

    for (i, article) in articles.iter().enumerate() {
        println!("\n{:>3}. {}", i + 1, article.title);
        if full {
            println!("\n{}\n", article.content);
        } else if !article.description.is_empty() {
            println!("     {}", summarize(&article.description));
        }
    }
}

fn summarize(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > SUMMARY_WIDTH {
        let truncated: String = single_line.chars().take(SUMMARY_WIDTH - 3).collect();
        format!("{}...", truncated)
    } else {
        single_line
    }
}

/// Install the global tracing subscriber.
///
/// Log lines go through a non-blocking writer; dropping the returned guard
/// flushes whatever is still buffered.
pub fn init_logging(logging: &LoggingConfig, debug: bool, verbose: bool) -> Result<WorkerGuard> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&logging.level)
            .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", logging.level, e)))?
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug);

    let (writer, guard) = if logging.log_to_file {
        let log_file = log_file_path(&logging.log_file)?;
        let directory = log_file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let file_name = log_file
            .file_name()
            .ok_or_else(|| Error::Config(format!("Invalid log file '{}'", logging.log_file)))?
            .to_owned();
        std::fs::create_dir_all(&directory)?;

        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
    } else {
        tracing_appender::non_blocking(io::stderr())
    };

    let installed = if logging.json_format {
        builder.json().with_writer(writer).try_init()
    } else {
        builder.with_writer(writer).try_init()
    };
    installed.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(guard)
}

/// Relative log paths live under the cache directory.
fn log_file_path(log_file: &str) -> Result<PathBuf> {
    let path = PathBuf::from(log_file);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(Config::cache_dir()?.join(path))
    }
}
