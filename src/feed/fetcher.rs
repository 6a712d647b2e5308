use crate::config::FetchSettings;
use crate::content::ContentExtractor;
use crate::error::{Error, Result};
use crate::feed::parser::FeedParser;
use crate::feed::{Article, ParsedFeed};
use crate::storage::ArticleFetcher;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

const MAX_REDIRECTS: usize = 10;

/// Retrieves feeds over HTTP and turns them into normalized articles.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    parser: FeedParser,
    extractor: ContentExtractor,
    timeout_duration: Duration,
    user_agent: String,
}

impl FeedFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let timeout_duration = settings.timeout_duration();
        let client = Client::builder()
            .timeout(timeout_duration)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            parser: FeedParser::new(),
            extractor: ContentExtractor::new()?,
            timeout_duration,
            user_agent: settings.user_agent.clone(),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(&FetchSettings::default())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        debug!("Fetching feed from: {}", url);

        self.parser.validate_feed_url(url)?;

        let response = timeout(self.timeout_duration, self.fetch_response(url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))??;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let content = timeout(self.timeout_duration, response.bytes())
            .await
            .map_err(|_| Error::Timeout(format!("Reading {} timed out", url)))?
            .map_err(|e| Error::HttpError(format!("Failed to read response body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", content.len(), url);

        self.parser.parse_feed(std::io::Cursor::new(content))
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "application/rss+xml, application/atom+xml, application/feed+json, application/xml, text/xml, */*",
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(format!("Request to {} timed out", url))
                } else {
                    Error::HttpError(format!("Request failed: {}", e))
                }
            })
    }
}

#[async_trait]
impl ArticleFetcher for FeedFetcher {
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Article>> {
        let feed = self.fetch_feed(url).await?;
        Ok(feed
            .articles
            .iter()
            .map(|parsed| self.extractor.normalize(parsed))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test Feed</title>
        <description>A test feed</description>
        <link>https://example.com</link>
        <item>
            <title>Test Article</title>
            <link>https://example.com/article</link>
            <description>&lt;p&gt;Test &lt;b&gt;article&lt;/b&gt; description&lt;/p&gt;</description>
            <pubDate>Wed, 15 Mar 2024 10:00:00 GMT</pubDate>
        </item>
    </channel>
</rss>"#;

    async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_valid_feed() {
        let mock_server = MockServer::start().await;
        serve(
            &mock_server,
            "/feed.xml",
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS_RESPONSE)
                .insert_header("content-type", "application/rss+xml"),
        )
        .await;

        let fetcher = FeedFetcher::with_defaults().unwrap();
        let feed = fetcher
            .fetch_feed(&format!("{}/feed.xml", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.articles.len(), 1);
        assert_eq!(feed.articles[0].title, "Test Article");
    }

    #[tokio::test]
    async fn test_fetch_articles_normalizes_items() {
        let mock_server = MockServer::start().await;
        serve(
            &mock_server,
            "/feed.xml",
            ResponseTemplate::new(200).set_body_string(VALID_RSS_RESPONSE),
        )
        .await;

        let fetcher = FeedFetcher::with_defaults().unwrap();
        let articles = fetcher
            .fetch_articles(&format!("{}/feed.xml", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.title, "Test Article");
        assert!(article.description.contains("description"));
        assert!(!article.description.contains("<p>"));
        assert!(article.content.starts_with("# Test Article"));
        assert!(article.content.contains("https://example.com/article"));
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/missing.xml", ResponseTemplate::new(404)).await;

        let fetcher = FeedFetcher::with_defaults().unwrap();
        let result = fetcher
            .fetch_articles(&format!("{}/missing.xml", mock_server.uri()))
            .await;

        match result {
            Err(Error::HttpError(msg)) => assert!(msg.contains("404")),
            other => panic!("Expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        serve(
            &mock_server,
            "/slow.xml",
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_string(VALID_RSS_RESPONSE),
        )
        .await;

        let fetcher = FeedFetcher::with_defaults()
            .unwrap()
            .with_timeout(Duration::from_millis(100));
        let result = fetcher
            .fetch_feed(&format!("{}/slow.xml", mock_server.uri()))
            .await;

        match result {
            Err(Error::Timeout(msg)) => assert!(msg.contains("timed out")),
            other => panic!("Expected Timeout error, got {:?}", other.map(|f| f.title)),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mock_server = MockServer::start().await;
        serve(
            &mock_server,
            "/broken.xml",
            ResponseTemplate::new(200).set_body_string("this is not a feed"),
        )
        .await;

        let fetcher = FeedFetcher::with_defaults().unwrap();
        let result = fetcher
            .fetch_feed(&format!("{}/broken.xml", mock_server.uri()))
            .await;

        assert!(matches!(result, Err(Error::FeedParse(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_schemes() {
        let fetcher = FeedFetcher::with_defaults().unwrap();

        for url in ["ftp://example.com/feed.xml", "file:///local/feed.xml", "javascript:alert('xss')"] {
            let result = fetcher.fetch_articles(url).await;
            assert!(
                matches!(result, Err(Error::InvalidUrl(_))),
                "Expected InvalidUrl error for {}",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_user_agent_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .and(header("user-agent", "CustomBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS_RESPONSE))
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::with_defaults()
            .unwrap()
            .with_user_agent("CustomBot/1.0".to_string());
        let result = fetcher
            .fetch_feed(&format!("{}/feed.xml", mock_server.uri()))
            .await;

        assert!(result.is_ok());
    }
}
