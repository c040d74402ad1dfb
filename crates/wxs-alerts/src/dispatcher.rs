//! Publishes composed alerts to the notification sink

use std::sync::Arc;

use tracing::{info, instrument};
use wxs_core::{
    is_success_status, AlertMessage, DispatchReceipt, NotificationTransport, PipelineError,
    PipelineResult, PublishRequest,
};

pub struct AlertDispatcher {
    transport: Arc<dyn NotificationTransport>,
    topic: String,
}

impl AlertDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>, topic: impl Into<String>) -> Self {
        Self {
            transport,
            topic: topic.into(),
        }
    }

    /// Publish one alert. One call per breaching record, never batched.
    #[instrument(skip(self, message), fields(topic = %self.topic))]
    pub async fn dispatch(&self, message: &AlertMessage) -> PipelineResult<DispatchReceipt> {
        let request = PublishRequest {
            topic: self.topic.clone(),
            subject: message.subject.clone(),
            message: message.body.clone(),
        };

        let ack = self.transport.publish(request).await.map_err(|e| match e {
            PipelineError::DispatchFailed(_) => e,
            other => PipelineError::DispatchFailed(other.to_string()),
        })?;

        if !is_success_status(ack.status) {
            return Err(PipelineError::DispatchFailed(format!(
                "notification sink answered {}",
                ack.status
            )));
        }

        info!(
            message_id = ack.message_id.as_deref().unwrap_or("-"),
            status = ack.status,
            "Alert dispatched"
        );
        Ok(DispatchReceipt {
            message_id: ack.message_id,
            status: ack.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wxs_core::{PublishAck, ALERT_SUBJECT};

    struct ScriptedSink {
        reply: PipelineResult<PublishAck>,
        requests: Mutex<Vec<PublishRequest>>,
    }

    impl ScriptedSink {
        fn new(reply: PipelineResult<PublishAck>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl NotificationTransport for ScriptedSink {
        async fn publish(&self, request: PublishRequest) -> PipelineResult<PublishAck> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn message() -> AlertMessage {
        AlertMessage {
            subject: ALERT_SUBJECT.to_string(),
            body: "Rajada de Vento: 30 m/s\n".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_topic_subject_body() {
        let sink = ScriptedSink::new(Ok(PublishAck {
            message_id: Some("m-1".into()),
            status: 200,
        }));
        let dispatcher = AlertDispatcher::new(sink.clone(), "weather-alerts");

        let receipt = dispatcher.dispatch(&message()).await.unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("m-1"));

        let requests = sink.requests.lock().unwrap();
        assert_eq!(
            requests.as_slice(),
            &[PublishRequest {
                topic: "weather-alerts".into(),
                subject: "Alerta Meteorológico".into(),
                message: "Rajada de Vento: 30 m/s\n".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_rejected_publish_is_dispatch_failed() {
        let sink = ScriptedSink::new(Ok(PublishAck {
            message_id: None,
            status: 403,
        }));
        let dispatcher = AlertDispatcher::new(sink, "t");
        let err = dispatcher.dispatch(&message()).await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::DispatchFailed("notification sink answered 403".into())
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_dispatch_failed() {
        let sink = ScriptedSink::new(Err(PipelineError::WriteFailed("socket closed".into())));
        let dispatcher = AlertDispatcher::new(sink, "t");
        let err = dispatcher.dispatch(&message()).await.unwrap_err();
        assert_eq!(err.kind(), "dispatch_failed");
    }
}
