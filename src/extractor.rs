//! Post URL extraction.
//!
//! Search results come back as raw strings, sometimes with trailing text after
//! the link. Only LinkedIn post and feed-update URLs qualify; everything else
//! is dropped. This is a filter, not a normalizer: the matched URL is returned
//! exactly as it appears in the input.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref POST_URL_PATTERN: Regex =
        Regex::new(r"(https?://.*?linkedin\.com/(posts|feed/update)/.*?)(?:\s|$)")
            .expect("post URL pattern is valid");
}

/// Returns the first qualifying post URL found in `raw`, if any.
///
/// The URL ends at the first whitespace character or at the end of the input.
pub fn extract_post_url(raw: &str) -> Option<&str> {
    POST_URL_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Insertion-ordered set of qualifying URLs for a single search.
#[derive(Debug, Default, Clone)]
pub struct PostUrlCollector {
    urls: Vec<String>,
}

impl PostUrlCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the extractor on `raw` and keeps the URL if it has not been seen yet.
    ///
    /// Returns `true` only when a new URL was appended.
    pub fn offer(&mut self, raw: &str) -> bool {
        match extract_post_url(raw) {
            Some(url) if !self.urls.iter().any(|known| known == url) => {
                self.urls.push(url.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}
