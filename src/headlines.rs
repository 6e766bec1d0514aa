// =============================================================================
// Macro Headlines: top items from configured RSS sources
// =============================================================================
//
// Each source contributes the first few entries of its feed (RSS, Atom or
// RDF).  A source that
// fails to download or parse is skipped with a warning.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use feed_rs::model::{Entry, Feed};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// One headline as shown in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    /// Publication date as given by the source, possibly empty.
    pub published: String,
}

/// Headlines from the first `per_source` entries of `feed`. Entries without a
/// title or a link are dropped. The date is the published date, else the
/// updated date, else empty.
pub fn extract_headlines(feed: &Feed, per_source: usize) -> Vec<Headline> {
    feed.entries
        .iter()
        .take(per_source)
        .filter_map(|entry| {
            let title = entry.title.as_ref().map(|t| t.content.trim()).unwrap_or_default();
            let link = entry.links.first().map(|l| l.href.trim()).unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(Headline {
                title: title.to_string(),
                link: link.to_string(),
                published: entry_date(entry),
            })
        })
        .collect()
}

fn entry_date(entry: &Entry) -> String {
    entry
        .published
        .or(entry.updated)
        .map(|at| at.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default()
}

/// Drop repeated titles (first occurrence wins) and keep at most `limit`.
pub fn dedupe_headlines(headlines: Vec<Headline>, limit: usize) -> Vec<Headline> {
    let mut seen = HashSet::new();
    headlines
        .into_iter()
        .filter(|h| seen.insert(h.title.clone()))
        .take(limit)
        .collect()
}

/// Downloads RSS channels for the headline section.
#[derive(Debug, Clone)]
pub struct HeadlineClient {
    client: reqwest::Client,
}

impl HeadlineClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    #[instrument(skip(self), name = "headlines::fetch_feed")]
    async fn fetch_feed(&self, url: &str) -> Result<Feed> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} returned HTTP {status}");
        }

        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        feed_rs::parser::parse(&bytes[..])
            .with_context(|| format!("{url} is not a valid RSS or Atom document"))
    }

    /// Fetch every source concurrently, keeping source order in the result.
    pub async fn fetch_headlines<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a str>,
        per_source: usize,
        limit: usize,
    ) -> Vec<Headline> {
        let urls: Vec<&str> = urls.into_iter().collect();
        let feeds = join_all(urls.iter().map(|url| self.fetch_feed(url))).await;

        let mut headlines = Vec::new();
        for (url, feed) in urls.iter().zip(feeds) {
            match feed {
                Ok(feed) => headlines.extend(extract_headlines(&feed, per_source)),
                Err(e) => warn!(url, error = %e, "headline source skipped"),
            }
        }

        let headlines = dedupe_headlines(headlines, limit);
        debug!(sources = urls.len(), count = headlines.len(), "headlines collected");
        headlines
    }
}
