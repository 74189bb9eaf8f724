//! reqwest-backed [`ReceiptApi`].
//!
//! Every call is one attempt with no retry. A non-success status is turned
//! into [`ApiError::Status`] carrying the body's `error` field when present;
//! the body is read as text first so a failed response never costs a second
//! round trip to find out what went wrong.

use super::ReceiptApi;
use crate::config::ClientConfig;
use crate::error::{server_error_message, ApiError, ReceiptError};
use crate::response::ExtractionResponse;
use crate::upload::ReceiptUpload;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP client for the receipt extraction service.
#[derive(Debug, Clone)]
pub struct HttpReceiptApi {
    client: Client,
    base_url: Url,
}

impl HttpReceiptApi {
    /// Build a client from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ReceiptError> {
        let base_url = config.parsed_base_url()?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ReceiptError::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base URL. Each segment is
    /// percent-encoded, so a `/` inside a user id cannot change the route.
    pub fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // Base URLs are checked by `ClientConfig::parsed_base_url`, so they
        // can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Ask the service how much each participant owes for a receipt.
    ///
    /// Keys are participant ids; lines with nobody assigned are charged to
    /// participant `1` by the service.
    pub async fn calculate_split(
        &self,
        user_id: &str,
        receipt_id: &str,
    ) -> Result<BTreeMap<i64, f64>, ApiError> {
        let url = self.endpoint(["api", "split", "calculate-split"]);
        let request = self
            .client
            .post(url.clone())
            .query(&[("userId", user_id), ("receiptId", receipt_id)]);

        let body = self.send(request, &url).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Body {
            url: url.to_string(),
            reason: format!("expected a map of participant amounts: {e}"),
        })
    }

    /// Assign participants to one line of a stored receipt.
    ///
    /// Returns the service's confirmation text.
    pub async fn assign_users(
        &self,
        user_id: &str,
        receipt_id: &str,
        item_index: usize,
        participant_ids: &[i64],
    ) -> Result<String, ApiError> {
        let url = self.endpoint(["api", "split", "assign-users"]);
        let request = self
            .client
            .post(url.clone())
            .query(&[("userId", user_id), ("receiptId", receipt_id)])
            .query(&[("itemIndex", item_index)])
            .json(participant_ids);

        self.send(request, &url).await
    }

    /// Send `request` and return the body of a successful response.
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, ApiError> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            ApiError::Transport {
                url: url.to_string(),
                reason: if e.is_timeout() {
                    "timed out".to_string()
                } else {
                    e.to_string()
                },
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            "{} → HTTP {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let server_message = server_error_message(&body);
            warn!(
                "{} answered HTTP {}{}",
                url,
                status.as_u16(),
                server_message
                    .as_deref()
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            );
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                server_message,
            });
        }

        Ok(body)
    }
}

impl ReceiptApi for HttpReceiptApi {
    async fn extract(
        &self,
        upload: &ReceiptUpload,
        user_id: &str,
    ) -> Result<ExtractionResponse, ApiError> {
        let url = self.endpoint(["api", "receipts", "extract"]);
        info!(
            "Uploading {} ({} bytes) for user '{}'",
            upload.file_name(),
            upload.len(),
            user_id
        );

        let file = Part::bytes(upload.data().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str(upload.mime_type())
            .map_err(|e| ApiError::Request {
                url: url.to_string(),
                reason: format!("invalid MIME type '{}': {e}", upload.mime_type()),
            })?;
        let form = Form::new()
            .part("file", file)
            .text("userId", user_id.to_string());

        let body = self
            .send(self.client.post(url.clone()).multipart(form), &url)
            .await?;
        Ok(ExtractionResponse::from_body(&body))
    }

    async fn receipt_text(&self, user_id: &str, receipt_id: &str) -> Result<String, ApiError> {
        let url = self.endpoint(["api", "receipts", user_id, receipt_id]);
        info!("Fetching raw text of receipt '{}' for user '{}'", receipt_id, user_id);
        self.send(self.client.get(url.clone()), &url).await
    }
}
