use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use wxs_core::{NotificationTransport, PipelineResult, PublishAck, PublishRequest};

/// Notification sink that only writes the alert to the log
#[derive(Default)]
pub struct LogNotifier {
    sent: AtomicU64,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NotificationTransport for LogNotifier {
    async fn publish(&self, request: PublishRequest) -> PipelineResult<PublishAck> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id = format!("log-{}", n);
        info!(
            topic = %request.topic,
            subject = %request.subject,
            message = %request.message,
            message_id = %message_id,
            "Alert notification"
        );
        Ok(PublishAck {
            message_id: Some(message_id),
            status: 200,
        })
    }
}
