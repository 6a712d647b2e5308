use crate::content::DEFAULT_TEXT_WIDTH;
use crate::error::{Error, Result};
use crate::feed::{Article, ParsedArticle};
use html2md::parse_html;
use regex::Regex;

/// Turns parsed feed items into reader-ready articles: the summary becomes
/// plain text and the body becomes a Markdown document.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    text_width: usize,
    regex_patterns: RegexPatterns,
}

#[derive(Debug, Clone)]
struct RegexPatterns {
    multiple_newlines: Regex,
    trailing_whitespace: Regex,
}

impl RegexPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            multiple_newlines: Regex::new(r"\n{3,}")
                .map_err(|e| Error::Config(format!("Invalid content pattern: {}", e)))?,
            trailing_whitespace: Regex::new(r"(?m)[ \t]+$")
                .map_err(|e| Error::Config(format!("Invalid content pattern: {}", e)))?,
        })
    }
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        Self::with_text_width(DEFAULT_TEXT_WIDTH)
    }

    pub fn with_text_width(text_width: usize) -> Result<Self> {
        Ok(Self {
            text_width: text_width.max(1),
            regex_patterns: RegexPatterns::new()?,
        })
    }

    /// Normalize a parsed item into an `Article`.
    pub fn normalize(&self, parsed: &ParsedArticle) -> Article {
        let description = parsed
            .description
            .as_deref()
            .map(|html| self.html_to_text(html))
            .unwrap_or_default();

        Article {
            title: parsed.title.trim().to_string(),
            description,
            content: self.markdownize(parsed),
        }
    }

    /// Render an HTML fragment as wrapped plain text.
    pub fn html_to_text(&self, html: &str) -> String {
        let text = html2text::from_read(html.as_bytes(), self.text_width);
        self.tidy(&text)
    }

    /// Build the Markdown body shown when an article is opened.
    ///
    /// Feeds without a full body fall back to their summary.
    pub fn markdownize(&self, parsed: &ParsedArticle) -> String {
        let mut document = format!("# {}\n\n", parsed.title.trim());

        let byline = match (&parsed.author, &parsed.published) {
            (Some(author), Some(published)) => {
                Some(format!("_By {} on {}_", author, published.format("%Y-%m-%d")))
            }
            (Some(author), None) => Some(format!("_By {}_", author)),
            (None, Some(published)) => Some(format!("_{}_", published.format("%Y-%m-%d"))),
            (None, None) => None,
        };
        if let Some(byline) = byline {
            document.push_str(&byline);
            document.push_str("\n\n");
        }

        if let Some(body) = parsed.content.as_deref().or(parsed.description.as_deref()) {
            document.push_str(&parse_html(body));
            document.push_str("\n\n");
        }

        if !parsed.link.is_empty() {
            document.push_str(&format!("[Read the full article]({})\n", parsed.link));
        }

        self.tidy(&document)
    }

    fn tidy(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let text = self.regex_patterns.trailing_whitespace.replace_all(&text, "");
        let text = self.regex_patterns.multiple_newlines.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}
