//! Notification sink that POSTs alerts to an HTTP endpoint

use reqwest::Client;
use wxs_core::{NotificationTransport, PipelineError, PipelineResult, PublishAck, PublishRequest};

/// Response header carrying the receiver's message id, when it sends one
pub const MESSAGE_ID_HEADER: &str = "x-message-id";

pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> PipelineResult<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(PipelineError::DispatchFailed("empty webhook url".into()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| PipelineError::DispatchFailed(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl NotificationTransport for WebhookNotifier {
    async fn publish(&self, request: PublishRequest) -> PipelineResult<PublishAck> {
        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::DispatchFailed(e.to_string()))?;

        let message_id = resp
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(PublishAck {
            message_id,
            status: resp.status().as_u16(),
        })
    }
}
