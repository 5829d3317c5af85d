//! Error types for Memebot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemebotError>;

#[derive(Error, Debug)]
pub enum MemebotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Malformed entry: {0}")]
    Entry(#[from] EntryError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl MemebotError {
    /// Returns the appropriate exit code for this error
    ///
    /// Remote rejections exit with the HTTP status folded into the range a
    /// process can report; a status that folds to zero exits with 1 so it is
    /// never mistaken for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            MemebotError::Config(_) => 2,
            MemebotError::Entry(_) => 3,
            MemebotError::Platform(PlatformError::Rejected { status, .. }) => {
                match i32::from(*status) % 256 {
                    0 => 1,
                    code => code,
                }
            }
            MemebotError::Platform(_) => 1,
            MemebotError::Feed(_) => 1,
            MemebotError::Ledger(_) => 1,
        }
    }

    /// Whether this error is the expected "nothing left to post" condition
    pub fn is_exhausted(&self) -> bool {
        matches!(self, MemebotError::Feed(FeedError::NoUnpostedEntries))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("MASTODON_TOKEN not set")]
    MissingToken,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger file not found at {0} (create it with `touch` before the first run)")]
    Missing(String),

    #[error("Ledger I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse feed: {0}")]
    Parse(String),

    #[error("No unposted entries found")]
    NoUnpostedEntries,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry {id} has no enclosure link")]
    MissingEnclosure { id: String },

    #[error("entry {id} has no link")]
    MissingLink { id: String },
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{endpoint} request rejected with HTTP {status}: {body}")]
    Rejected {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Media source unavailable: {0}")]
    MediaSource(String),
}
