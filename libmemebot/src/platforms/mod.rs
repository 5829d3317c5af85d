//! Publishing targets
//!
//! A [`Publisher`] performs the two calls needed to post a meme: upload the
//! image, then create a status that references it.
//!
//! ```no_run
//! use libmemebot::config::Credentials;
//! use libmemebot::platforms::{mastodon::MastodonClient, Publisher};
//! use libmemebot::post::CaptionRules;
//!
//! # async fn example(post: libmemebot::PostRecord) -> libmemebot::Result<()> {
//! let credentials = Credentials::new("mastodon.online", "token".to_string())?;
//! let client = MastodonClient::new(reqwest::Client::new(), &credentials, CaptionRules::default());
//!
//! let media_id = client.upload_media(&post).await?;
//! let published = client.create_status(&post, &media_id).await?;
//! println!("Posted {}", published.uri);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PostRecord, PublishResult};

pub mod mastodon;

// Available outside tests so integration tests can drive the runner
pub mod mock;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload the post's image and return the platform's media id
    ///
    /// # Errors
    ///
    /// - `PlatformError::MediaSource` if the image cannot be downloaded
    /// - `PlatformError::Network` on transport failure
    /// - `PlatformError::Rejected` on a non-success status
    async fn upload_media(&self, post: &PostRecord) -> Result<String>;

    /// Create a status carrying the rendered caption and the uploaded media
    ///
    /// The post id doubles as the idempotency key, so a repeated identical
    /// request does not produce a second status.
    async fn create_status(&self, post: &PostRecord, media_id: &str) -> Result<PublishResult>;

    /// Lowercase platform identifier (e.g. "mastodon")
    fn name(&self) -> &str;
}
