//! One run of the bot: select, assemble, upload, post, record
//!
//! Stages run strictly in order and nothing is retried. The only early exit
//! that is not a failure is an exhausted feed. A failed stage stops the run
//! before anything is written to the ledger.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::MemebotError;
use crate::feed::FeedSelector;
use crate::ledger::Ledger;
use crate::platforms::Publisher;
use crate::post::assemble;
use crate::types::LedgerEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    FetchSelect,
    Assemble,
    UploadMedia,
    CreateStatus,
    Record,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::FetchSelect => write!(f, "fetch/select"),
            RunStage::Assemble => write!(f, "assemble"),
            RunStage::UploadMedia => write!(f, "upload media"),
            RunStage::CreateStatus => write!(f, "create status"),
            RunStage::Record => write!(f, "record"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A meme went out and was recorded
    Posted(LedgerEntry),
    /// Every entry in the feed has already been posted
    NothingToPost,
}

/// A run that stopped at `stage`
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {error}")]
pub struct RunFailure {
    pub stage: RunStage,
    #[source]
    pub error: MemebotError,
}

impl RunFailure {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

trait AtStage<T> {
    fn at(self, stage: RunStage) -> Result<T, RunFailure>;
}

impl<T> AtStage<T> for crate::Result<T> {
    fn at(self, stage: RunStage) -> Result<T, RunFailure> {
        self.map_err(|error| RunFailure { stage, error })
    }
}

pub struct Runner<'a> {
    selector: &'a FeedSelector,
    publisher: &'a dyn Publisher,
    ledger: &'a Ledger,
}

impl<'a> Runner<'a> {
    pub fn new(
        selector: &'a FeedSelector,
        publisher: &'a dyn Publisher,
        ledger: &'a Ledger,
    ) -> Self {
        Self {
            selector,
            publisher,
            ledger,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, RunFailure> {
        info!("Fetching memes and selecting an unposted meme...");
        let entry = match self.selector.choose(self.ledger).await {
            Ok(entry) => entry,
            Err(error) if error.is_exhausted() => {
                info!("No unposted memes found -- exiting!");
                return Ok(RunOutcome::NothingToPost);
            }
            Err(error) => {
                return Err(RunFailure {
                    stage: RunStage::FetchSelect,
                    error,
                })
            }
        };
        debug!("Entry: {}", pretty(&entry));

        let post = assemble(&entry).at(RunStage::Assemble)?;
        debug!("Post: {}", pretty(&post));

        info!("Posting image to {}...", self.publisher.name());
        let media_id = self
            .publisher
            .upload_media(&post)
            .await
            .at(RunStage::UploadMedia)?;
        debug!("Media ID: {}", media_id);

        info!("Posting status to {}...", self.publisher.name());
        let published = self
            .publisher
            .create_status(&post, &media_id)
            .await
            .at(RunStage::CreateStatus)?;
        debug!("Published: {}", pretty(&published));

        let record = LedgerEntry::from_publish(&post.id, &published);
        self.ledger.record(&record).at(RunStage::Record)?;

        info!("...completed!");
        Ok(RunOutcome::Posted(record))
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
