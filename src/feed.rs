// =============================================================================
// Feed Store & RSS Writer
// =============================================================================
//
// Each run appends one item to a rolling JSON store (newest last, capped at
// `max_items`) and then republishes the whole store as an RSS 2.0 channel,
// newest first.  Store writes use the tmp + rename pattern.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::report::{render_html, Report};
use crate::runtime_config::FeedConfig;

/// One published feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub guid: String,
    pub title: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    /// HTML body of the item.
    pub description: String,
}

impl FeedItem {
    /// Build the item for `report`, keyed by its generation instant.
    pub fn from_report(report: &Report, link: &str) -> Self {
        let at = report.generated_at_utc;
        Self {
            guid: at.format("%Y%m%d%H%M%S").to_string(),
            title: format!(
                "FX Session Plan — {} — {}",
                report.session,
                at.format("%Y-%m-%d %H:%M UTC")
            ),
            link: link.to_string(),
            pub_date: rfc822(at),
            description: render_html(report),
        }
    }

    fn to_rss(&self) -> Item {
        let guid = GuidBuilder::default()
            .value(self.guid.clone())
            .permalink(false)
            .build();
        ItemBuilder::default()
            .title(Some(self.title.clone()))
            .link(Some(self.link.clone()))
            .guid(Some(guid))
            .pub_date(Some(self.pub_date.clone()))
            .description(Some(self.description.clone()))
            .build()
    }
}

fn rfc822(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

// =============================================================================
// ItemStore
// =============================================================================

/// Rolling item store, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStore {
    items: Vec<FeedItem>,
}

impl ItemStore {
    /// Load the store at `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no item store yet, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read item store {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse item store {}", path.display()))
    }

    /// Append `item` and drop the oldest entries beyond `max_items`.
    /// A `max_items` of 0 means no cap.
    pub fn push(&mut self, item: FeedItem, max_items: usize) {
        self.items.push(item);
        if max_items == 0 {
            return;
        }
        let excess = self.items.len().saturating_sub(max_items);
        self.items.drain(..excess);
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Atomic write (tmp sibling + rename), creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise item store")?;
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp store to {}", path.display()))?;

        info!(path = %path.display(), items = self.items.len(), "item store saved");
        Ok(())
    }
}

// =============================================================================
// RSS
// =============================================================================

/// Build the channel for `store`, newest item first.
pub fn build_channel(config: &FeedConfig, store: &ItemStore) -> Channel {
    let items: Vec<Item> = store.items().iter().rev().map(FeedItem::to_rss).collect();
    ChannelBuilder::default()
        .title(config.feed_title.clone())
        .link(config.feed_link.clone())
        .description(config.feed_description.clone())
        .language(Some(config.feed_language.clone()))
        .last_build_date(store.items().last().map(|i| i.pub_date.clone()))
        .items(items)
        .build()
}

/// Serialise the channel to an XML document.
pub fn render_rss(config: &FeedConfig, store: &ItemStore) -> Result<String> {
    let bytes = build_channel(config, store)
        .write_to(Vec::new())
        .context("failed to serialise RSS channel")?;
    String::from_utf8(bytes).context("RSS output is not UTF-8")
}

pub fn write_feed(path: impl AsRef<Path>, xml: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    std::fs::write(path, xml).with_context(|| format!("failed to write feed {}", path.display()))?;
    info!(path = %path.display(), bytes = xml.len(), "RSS feed written");
    Ok(())
}
