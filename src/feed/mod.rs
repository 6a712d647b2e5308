pub mod fetcher;
pub mod parser;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscribed feed. The cache is keyed by `url` and never mutates a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub whitelist_words: Vec<String>,
    #[serde(default)]
    pub blacklist_words: Vec<String>,
}

/// A normalized article as served to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Plain text summary.
    pub description: String,
    /// Markdown body.
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub last_build_date: Option<DateTime<Utc>>,
    pub articles: Vec<ParsedArticle>,
}

#[derive(Debug, Clone)]
pub struct ParsedArticle {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub guid: Option<String>,
    pub categories: Vec<String>,
}

impl Feed {
    /// A feed with no filters whose display name is its URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
            whitelist_words: Vec::new(),
            blacklist_words: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_whitelist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blacklist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// True when at least one non-blank whitelist or blacklist word is set.
    pub fn has_filters(&self) -> bool {
        self.whitelist_words
            .iter()
            .chain(self.blacklist_words.iter())
            .any(|word| !word.trim().is_empty())
    }
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            content: content.into(),
        }
    }

    /// Lowercased title, description and content, concatenated. This is the
    /// text that filter words are matched against.
    pub fn searchable_text(&self) -> String {
        let mut text =
            String::with_capacity(self.title.len() + self.description.len() + self.content.len());
        text.push_str(&self.title);
        text.push_str(&self.description);
        text.push_str(&self.content);
        text.to_lowercase()
    }
}
