//! One producer invocation: fetch, then publish

use std::sync::Arc;

use tracing::{error, info, instrument};
use wxs_core::{PipelineResult, RecordHandle, TelemetrySource};

use crate::StreamPublisher;

pub struct Producer {
    source: Arc<dyn TelemetrySource>,
    publisher: StreamPublisher,
}

impl Producer {
    pub fn new(source: Arc<dyn TelemetrySource>, publisher: StreamPublisher) -> Self {
        Self { source, publisher }
    }

    /// Fetch one snapshot and append it to the stream.
    ///
    /// A failed fetch returns before anything is published.
    #[instrument(skip(self), fields(stream = %self.publisher.stream_name()))]
    pub async fn run_once(&self) -> PipelineResult<RecordHandle> {
        let result = self.fetch_and_publish().await;
        match &result {
            Ok(handle) => info!(
                sequence_number = handle.sequence_number,
                "Snapshot published to stream"
            ),
            Err(e) => error!(kind = e.kind(), error = %e, "Producer invocation failed"),
        }
        result
    }

    async fn fetch_and_publish(&self) -> PipelineResult<RecordHandle> {
        let snapshot = self.source.fetch_snapshot().await?;
        self.publisher.publish(snapshot.as_bytes()).await
    }
}
