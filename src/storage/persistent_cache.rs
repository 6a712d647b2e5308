use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::storage::cache::CacheEntry;

/// Format version written into every cache file.
pub const CACHE_VERSION: u32 = 1;

/// On-disk layout of the article cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistentCacheData {
    pub cache_version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: HashMap<String, CacheEntry>,
}

/// Reads and writes the whole cache as a single JSON file.
#[derive(Debug, Clone)]
pub struct PersistentCache {
    cache_file: PathBuf,
}

impl PersistentCache {
    pub fn new(cache_file: impl Into<PathBuf>) -> Self {
        Self {
            cache_file: cache_file.into(),
        }
    }

    /// Load every entry from disk. A missing file yields an empty map.
    pub fn load(&self) -> Result<HashMap<String, CacheEntry>> {
        let file_content = match fs::read_to_string(&self.cache_file) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Cache file does not exist: {}", self.cache_file.display());
                return Ok(HashMap::new());
            }
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read cache file '{}': {}",
                    self.cache_file.display(),
                    e
                )))
            }
        };

        let cache_data: PersistentCacheData = serde_json::from_str(&file_content)?;

        if cache_data.cache_version != CACHE_VERSION {
            return Err(Error::Storage(format!(
                "Unsupported cache version {} in '{}' (expected {})",
                cache_data.cache_version,
                self.cache_file.display(),
                CACHE_VERSION
            )));
        }

        tracing::info!(
            "Loaded cache: {} feeds saved at {} from {}",
            cache_data.entries.len(),
            cache_data.saved_at,
            self.cache_file.display()
        );

        Ok(cache_data.entries)
    }

    /// Replace the cache file with `entries`.
    ///
    /// The data goes to a temporary file next to the cache file which is then
    /// renamed over it, so readers never observe a partial write.
    pub fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            cache_version: u32,
            saved_at: DateTime<Utc>,
            entries: &'a HashMap<String, CacheEntry>,
        }

        let json_content = serde_json::to_vec_pretty(&Borrowed {
            cache_version: CACHE_VERSION,
            saved_at: Utc::now(),
            entries,
        })?;

        let cache_dir = match self.cache_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::Storage(format!(
                "Failed to create cache directory '{}': {}",
                cache_dir.display(),
                e
            ))
        })?;

        let mut temp_file = NamedTempFile::new_in(&cache_dir).map_err(|e| {
            Error::Storage(format!(
                "Failed to create temporary cache file in '{}': {}",
                cache_dir.display(),
                e
            ))
        })?;
        temp_file
            .write_all(&json_content)
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|e| Error::Storage(format!("Failed to write cache: {}", e)))?;

        temp_file.persist(&self.cache_file).map_err(|e| {
            Error::Storage(format!(
                "Failed to replace cache file '{}': {}",
                self.cache_file.display(),
                e.error
            ))
        })?;

        tracing::info!(
            "Saved cache: {} feeds to {}",
            entries.len(),
            self.cache_file.display()
        );

        Ok(())
    }

    /// Current cache file size, zero when it does not exist yet.
    pub fn cache_size_bytes(&self) -> u64 {
        fs::metadata(&self.cache_file)
            .map(|metadata| metadata.len())
            .unwrap_or(0)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_file
    }
}
