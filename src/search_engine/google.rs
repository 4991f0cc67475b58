//! Search engine backed by Google's HTML result pages.
//!
//! Result pages are fetched one at a time as the stream is consumed. Links are
//! taken from the anchors on the page; redirect links of the form
//! `/url?q=<target>&...` are unwrapped and percent-decoded.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::debug;

use super::{SearchEngine, SearchEngineError, SearchResultStream};

lazy_static! {
    static ref ANCHOR_SELECTOR: Selector =
        Selector::parse("a[href]").expect("anchor selector is valid");
}

const REDIRECT_PREFIX: &str = "/url?q=";

/// Extra results requested per page on top of what is still needed, since
/// some anchors on a page are never results.
const PAGE_SLACK: usize = 2;

#[derive(Debug, Clone)]
pub struct GoogleSearchConfig {
    /// Search endpoint, e.g. "https://www.google.com/search".
    pub base_url: String,
    /// Interface language passed as `hl`.
    pub language: String,
    pub user_agent: String,
    /// Timeout for each page request.
    pub timeout: Duration,
    /// Pause between consecutive result pages of the same query.
    pub page_pause: Duration,
}

impl Default for GoogleSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            language: "en".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            timeout: Duration::from_secs(10),
            page_pause: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct GoogleSearchEngine {
    client: reqwest::Client,
    config: Arc<GoogleSearchConfig>,
}

impl GoogleSearchEngine {
    pub fn new(config: GoogleSearchConfig) -> Result<Self, SearchEngineError> {
        if config.base_url.trim().is_empty() {
            return Err(SearchEngineError::Config(
                "base_url must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    async fn fetch_page(
        &self,
        query: &str,
        start: usize,
        num: usize,
    ) -> Result<Vec<String>, SearchEngineError> {
        debug!("Fetching result page for {:?} (start={}, num={})", query, start, num);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", query.to_string()),
                ("num", num.to_string()),
                ("hl", self.config.language.clone()),
                ("start", start.to_string()),
                ("safe", "active".to_string()),
            ])
            .header(reqwest::header::COOKIE, "CONSENT=YES+")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchEngineError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_result_links(&body))
    }
}

impl SearchEngine for GoogleSearchEngine {
    fn search(&self, query: &str, max_results: usize) -> SearchResultStream {
        let cursor = PageCursor {
            engine: self.clone(),
            query: query.to_string(),
            max_results,
            start: 0,
            yielded: 0,
            pages_fetched: 0,
            seen: HashSet::new(),
            pending: VecDeque::new(),
            exhausted: false,
        };

        Box::pin(futures::stream::unfold(cursor, |mut cursor| async move {
            cursor.next_result().await.map(|item| (item, cursor))
        }))
    }
}

struct PageCursor {
    engine: GoogleSearchEngine,
    query: String,
    max_results: usize,
    start: usize,
    yielded: usize,
    pages_fetched: usize,
    seen: HashSet<String>,
    pending: VecDeque<String>,
    exhausted: bool,
}

impl PageCursor {
    async fn next_result(&mut self) -> Option<Result<String, SearchEngineError>> {
        loop {
            if self.yielded >= self.max_results {
                return None;
            }
            if let Some(url) = self.pending.pop_front() {
                self.yielded += 1;
                return Some(Ok(url));
            }
            if self.exhausted {
                return None;
            }

            if self.pages_fetched > 0 {
                tokio::time::sleep(self.engine.config.page_pause).await;
            }

            let wanted = self.max_results - self.yielded + PAGE_SLACK;
            match self.engine.fetch_page(&self.query, self.start, wanted).await {
                Ok(links) => {
                    self.pages_fetched += 1;
                    self.start += links.len();

                    let before = self.pending.len();
                    for link in links {
                        if self.seen.insert(link.clone()) {
                            self.pending.push_back(link);
                        }
                    }
                    if self.pending.len() == before {
                        self.exhausted = true;
                    }
                }
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Collects the outbound result links from a result page, in page order.
pub(crate) fn parse_result_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(link) = resolve_href(href) else {
            continue;
        };
        if is_engine_link(&link) {
            continue;
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

fn resolve_href(href: &str) -> Option<String> {
    if let Some(target) = href.strip_prefix(REDIRECT_PREFIX) {
        let encoded = target.split('&').next().unwrap_or_default();
        let decoded = urlencoding::decode(encoded).ok()?;
        return is_http_url(&decoded).then(|| decoded.into_owned());
    }

    is_http_url(href).then(|| href.to_string())
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn is_engine_link(url: &str) -> bool {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = without_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    host.contains("google.") || host.ends_with("googleusercontent.com")
}
