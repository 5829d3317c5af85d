//! Core types for Memebot

use serde::{Deserialize, Serialize};

/// Relation tag marking a link as attached media
pub const ENCLOSURE_REL: &str = "enclosure";

/// One item of the source feed, rebuilt from scratch on every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// The feed's globally-unique identifier, as published
    pub guid: String,
    pub link: Option<String>,
    /// HTML-bearing summary; empty when the feed has none
    pub summary: String,
    pub links: Vec<FeedLink>,
}

impl FeedEntry {
    /// Stable id: everything after the last `#` in the guid
    pub fn id(&self) -> &str {
        meme_id(&self.guid)
    }

    /// First link tagged as an enclosure, in document order
    pub fn enclosure(&self) -> Option<&FeedLink> {
        self.links
            .iter()
            .find(|link| link.rel.as_deref() == Some(ENCLOSURE_REL))
    }
}

/// Extract the id from a guid such as `https://memes.sucho.org/#1234`
pub fn meme_id(guid: &str) -> &str {
    guid.rsplit('#').next().unwrap_or(guid)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLink {
    pub rel: Option<String>,
    pub href: String,
    pub media_type: Option<String>,
}

/// Normalized projection of a feed entry, ready to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub link: String,
    pub summary: String,
    pub media_url: String,
    pub media_filename: String,
    pub media_mime: String,
}

/// The subset of Mastodon's status entity the ledger needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub created_at: String,
    pub uri: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One line of the ledger file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub posted_at: String,
    pub uri: String,
}

impl LedgerEntry {
    pub fn new(id: impl Into<String>, posted_at: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            posted_at: posted_at.into(),
            uri: uri.into(),
        }
    }

    pub fn from_publish(id: &str, result: &PublishResult) -> Self {
        Self::new(id, result.created_at.as_str(), result.uri.as_str())
    }

    /// Parse a whitespace-delimited ledger line; `None` for blank lines
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let id = fields.next()?;
        let posted_at = fields.next().unwrap_or_default();
        let uri = fields.next().unwrap_or_default();
        Some(Self::new(id, posted_at, uri))
    }

    pub fn to_line(&self) -> String {
        format!("{} {} {}\n", self.id, self.posted_at, self.uri)
    }
}
