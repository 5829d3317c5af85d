//! Mock publisher for testing
//!
//! Records every call and can be told to fail at either step, so runner
//! behavior can be checked without a network.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::post::{render_caption, CaptionRules};
use crate::types::{PostRecord, PublishResult};

/// Which step, if any, should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockFailure {
    #[default]
    None,
    /// Media upload answers with this HTTP status
    Upload(u16),
    /// Status creation answers with this HTTP status
    Status(u16),
}

#[derive(Debug, Default)]
struct Calls {
    uploads: Vec<String>,
    statuses: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockPublisher {
    failure: MockFailure,
    rules: CaptionRules,
    calls: Arc<Mutex<Calls>>,
}

impl MockPublisher {
    /// A publisher that accepts everything
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failing(failure: MockFailure) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }

    /// Post ids passed to `upload_media`, in call order
    pub fn uploads(&self) -> Vec<String> {
        self.calls().uploads.clone()
    }

    /// Captions passed to `create_status`, in call order
    pub fn statuses(&self) -> Vec<String> {
        self.calls().statuses.clone()
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn upload_media(&self, post: &PostRecord) -> Result<String> {
        self.calls().uploads.push(post.id.clone());

        if let MockFailure::Upload(status) = self.failure {
            return Err(PlatformError::Rejected {
                endpoint: "media",
                status,
                body: "mock upload failure".to_string(),
            }
            .into());
        }

        Ok(format!("mock-media-{}", post.id))
    }

    async fn create_status(&self, post: &PostRecord, media_id: &str) -> Result<PublishResult> {
        let caption = render_caption(post, &self.rules);
        self.calls().statuses.push(caption);

        if let MockFailure::Status(status) = self.failure {
            return Err(PlatformError::Rejected {
                endpoint: "status",
                status,
                body: "mock status failure".to_string(),
            }
            .into());
        }

        Ok(PublishResult {
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            uri: format!("https://mock.social/statuses/{}", post.id),
            id: Some(media_id.to_string()),
            url: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
