//! Memebot - repost memes from an RSS feed to Mastodon
//!
//! Each run fetches the feed, picks a meme that the ledger has not seen,
//! uploads its image, posts a status and appends the result to the ledger.

pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod logging;
pub mod platforms;
pub mod post;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{MemebotError, Result};
pub use feed::FeedSelector;
pub use ledger::Ledger;
pub use runner::{RunFailure, RunOutcome, RunStage, Runner};
pub use types::{FeedEntry, LedgerEntry, PostRecord, PublishResult};
