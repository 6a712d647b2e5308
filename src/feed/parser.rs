use crate::error::{Error, Result};
use crate::feed::{ParsedArticle, ParsedFeed};
use feed_rs::model::Entry;
use feed_rs::parser as feed_parser;
use std::io::BufRead;

/// Parses RSS 0.9x/1.0/2.0, Atom and JSON Feed documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed<R: BufRead>(&self, reader: R) -> Result<ParsedFeed> {
        let feed = feed_parser::parse(reader)
            .map_err(|e| Error::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let title = feed
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled Feed".to_string());

        Ok(ParsedFeed {
            title,
            description: feed.description.map(|d| d.content),
            link: feed.links.first().map(|l| l.href.clone()),
            last_build_date: feed.updated.or(feed.published),
            articles: feed.entries.into_iter().map(parse_entry).collect(),
        })
    }

    pub fn parse_str(&self, document: &str) -> Result<ParsedFeed> {
        self.parse_feed(document.as_bytes())
    }

    pub fn validate_feed_url(&self, url: &str) -> Result<()> {
        let parsed_url =
            url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        match parsed_url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!("Unsupported scheme: {}", scheme))),
        }
    }
}

fn parse_entry(entry: Entry) -> ParsedArticle {
    // feed-rs always fills in an id, generating one when the source has none
    let guid = (!entry.id.is_empty()).then_some(entry.id);

    ParsedArticle {
        title: entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string()),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        description: entry.summary.map(|s| s.content),
        content: entry.content.and_then(|c| c.body),
        author: entry.authors.first().map(|a| a.name.clone()),
        published: entry.published.or(entry.updated),
        guid,
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
    }
}
