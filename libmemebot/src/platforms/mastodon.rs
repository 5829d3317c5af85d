//! Mastodon publishing over the REST API
//!
//! Media goes to `POST /api/v2/media` as multipart form data, streamed
//! straight from the enclosure URL. The status goes to
//! `POST /api/v1/statuses` as a form with an `Idempotency-Key` header.
//! Failures are returned, never retried.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::post::{render_caption, CaptionRules};
use crate::types::{PostRecord, PublishResult};

const MEDIA_ENDPOINT: &str = "/api/v2/media";
const STATUSES_ENDPOINT: &str = "/api/v1/statuses";

/// Media attachment entity; only the id matters here
#[derive(Debug, Deserialize)]
struct MediaAttachment {
    id: String,
}

pub struct MastodonClient {
    client: reqwest::Client,
    instance_url: String,
    access_token: SecretString,
    rules: CaptionRules,
}

impl MastodonClient {
    pub fn new(client: reqwest::Client, credentials: &Credentials, rules: CaptionRules) -> Self {
        Self {
            client,
            instance_url: credentials.instance_url.clone(),
            access_token: SecretString::from(credentials.token().to_string()),
            rules,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.instance_url, path)
    }

    /// Open the enclosure as a byte stream, with its length when the
    /// source reports one
    async fn media_body(&self, post: &PostRecord) -> Result<(Body, Option<u64>)> {
        let response = self
            .client
            .get(&post.media_url)
            .send()
            .await
            .map_err(|e| {
                PlatformError::MediaSource(format!("{}: {}", post.media_url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::MediaSource(format!(
                "{}: HTTP {}",
                post.media_url,
                status.as_u16()
            ))
            .into());
        }

        let length = response.content_length();
        Ok((Body::wrap_stream(response.bytes_stream()), length))
    }
}

#[async_trait]
impl Publisher for MastodonClient {
    async fn upload_media(&self, post: &PostRecord) -> Result<String> {
        let (body, length) = self.media_body(post).await?;

        let part = match length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        }
        .file_name(post.media_filename.clone());

        // Enclosures without a type are sent untyped
        let part = if post.media_mime.is_empty() {
            part
        } else {
            part.mime_str(&post.media_mime).map_err(|e| {
                PlatformError::MediaSource(format!(
                    "invalid MIME type '{}': {}",
                    post.media_mime, e
                ))
            })?
        };
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint(MEDIA_ENDPOINT))
            .bearer_auth(self.access_token.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error("upload media", e))?;

        let response = check_status("media", response).await?;
        let media: MediaAttachment = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("media upload: {}", e)))?;

        Ok(media.id)
    }

    async fn create_status(&self, post: &PostRecord, media_id: &str) -> Result<PublishResult> {
        let caption = render_caption(post, &self.rules);
        debug!("Status text ({} chars):\n{}", caption.chars().count(), caption);

        let form = [("status", caption.as_str()), ("media_ids[]", media_id)];

        let response = self
            .client
            .post(self.endpoint(STATUSES_ENDPOINT))
            .bearer_auth(self.access_token.expose_secret())
            .header("Idempotency-Key", &post.id)
            .form(&form)
            .send()
            .await
            .map_err(|e| network_error("create status", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(
                "Status creation returned 404; this can be an Idempotency-Key collision for {}",
                post.id
            );
        }

        let response = check_status("status", response).await?;
        let published: PublishResult = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("status creation: {}", e)))?;

        Ok(published)
    }

    fn name(&self) -> &str {
        "mastodon"
    }
}

fn network_error(context: &str, error: reqwest::Error) -> PlatformError {
    PlatformError::Network(format!("Mastodon {} failed: {}", context, error))
}

/// Pass successful responses through; log and reject the rest
async fn check_status(endpoint: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("{}: {}", status.as_u16(), body);

    Err(PlatformError::Rejected {
        endpoint,
        status: status.as_u16(),
        body,
    }
    .into())
}
