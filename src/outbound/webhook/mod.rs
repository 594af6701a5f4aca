//! Reqwest-backed webhook sink adapter.
//!
//! Owns transport details only: client construction, the 10-second
//! total timeout, and the mapping from transport faults and HTTP
//! statuses onto the sink error the worker classifies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::domain::LocationCheck;
use crate::domain::ports::{WebhookSink, WebhookSinkError};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook sink POSTing JSON-encoded checks to one endpoint.
pub struct ReqwestWebhookSink {
    client: Client,
    url: String,
}

impl ReqwestWebhookSink {
    /// Build the sink.
    ///
    /// Certificate verification stays on unless `insecure_skip_verify`
    /// explicitly opts out.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: impl Into<String>, insecure_skip_verify: bool) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().timeout(DELIVERY_TIMEOUT);
        if insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl WebhookSink for ReqwestWebhookSink {
    async fn deliver(&self, check: &LocationCheck) -> Result<(), WebhookSinkError> {
        let payload = serde_json::to_vec(check)
            .map_err(|encode_error| WebhookSinkError::encode(encode_error.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|transport_error| WebhookSinkError::transport(transport_error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WebhookSinkError::status(status.as_u16()))
        }
    }
}
