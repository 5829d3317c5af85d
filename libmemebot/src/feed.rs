//! Fetching the meme feed and picking an unposted entry

use std::collections::HashSet;

use feed_rs::model::Entry;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::ledger::Ledger;
use crate::types::{FeedEntry, FeedLink, ENCLOSURE_REL};

pub struct FeedSelector {
    client: reqwest::Client,
    url: String,
}

impl FeedSelector {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Download and parse the feed
    pub async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        let fetch_error = |reason: String| FeedError::Fetch {
            url: self.url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        parse_feed(&body)
    }

    /// Pick a random entry whose id is not in the ledger
    ///
    /// The ledger is read after the feed is fetched, so a missing ledger
    /// surfaces only once the feed is known to be reachable.
    pub async fn choose(&self, ledger: &Ledger) -> Result<FeedEntry> {
        let entries = self.fetch().await?;
        debug!("Feed {} has {} entries", self.url, entries.len());

        let posted = ledger.posted_ids()?;
        select_unposted(entries, &posted, &mut rand::thread_rng())
    }
}

/// Shuffle `entries` and return the first one not in `posted`
pub fn select_unposted<R: Rng + ?Sized>(
    mut entries: Vec<FeedEntry>,
    posted: &HashSet<String>,
    rng: &mut R,
) -> Result<FeedEntry> {
    entries.shuffle(rng);

    for entry in entries {
        if !posted.contains(entry.id()) {
            return Ok(entry);
        }
        debug!("{} already posted", entry.id());
    }

    Err(FeedError::NoUnpostedEntries.into())
}

/// Parse an RSS, Atom or JSON feed body into entries
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FeedError::Parse(e.to_string()))?;
    Ok(feed.entries.into_iter().map(FeedEntry::from).collect())
}

impl From<Entry> for FeedEntry {
    fn from(entry: Entry) -> Self {
        let mut links: Vec<FeedLink> = entry
            .links
            .into_iter()
            .map(|link| FeedLink {
                rel: link.rel,
                href: link.href,
                media_type: link.media_type,
            })
            .collect();

        // RSS <enclosure> elements surface as media content, not links
        let enclosures = entry
            .media
            .into_iter()
            .flat_map(|media| media.content)
            .filter_map(|content| {
                let url = content.url?;
                Some(FeedLink {
                    rel: Some(ENCLOSURE_REL.to_string()),
                    href: url.to_string(),
                    media_type: content.content_type.map(|mime| mime.to_string()),
                })
            });
        links.extend(enclosures);

        let link = links
            .iter()
            .find(|link| link.rel.as_deref() != Some(ENCLOSURE_REL))
            .map(|link| link.href.clone());

        FeedEntry {
            guid: entry.id,
            link,
            summary: entry.summary.map(|text| text.content).unwrap_or_default(),
            links,
        }
    }
}
