pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{Article, Feed};
pub use storage::{ArticleFetcher, Cache, CacheEntry};
