//! Appends snapshots to the stream under the fixed partition key

use std::sync::Arc;

use tracing::debug;
use wxs_core::{
    is_success_status, PipelineError, PipelineResult, PutRecordRequest, RecordHandle,
    StreamTransport, PARTITION_KEY,
};

pub struct StreamPublisher {
    transport: Arc<dyn StreamTransport>,
    stream_name: String,
}

impl StreamPublisher {
    pub fn new(transport: Arc<dyn StreamTransport>, stream_name: impl Into<String>) -> Self {
        Self {
            transport,
            stream_name: stream_name.into(),
        }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Append one payload. Anything but a success acknowledgment is
    /// [`PipelineError::PublishFailed`].
    pub async fn publish(&self, payload: &[u8]) -> PipelineResult<RecordHandle> {
        let request = PutRecordRequest {
            stream_name: self.stream_name.clone(),
            partition_key: PARTITION_KEY.to_string(),
            data: payload.to_vec(),
        };

        let ack = self.transport.put_record(request).await.map_err(|e| match e {
            PipelineError::PublishFailed(_) => e,
            other => PipelineError::PublishFailed(other.to_string()),
        })?;

        if !is_success_status(ack.status) {
            return Err(PipelineError::PublishFailed(format!(
                "stream {} acknowledged with status {}",
                self.stream_name, ack.status
            )));
        }

        debug!(
            stream = %self.stream_name,
            sequence_number = ack.sequence_number,
            shard_id = %ack.shard_id,
            "Record appended"
        );
        Ok(RecordHandle {
            sequence_number: ack.sequence_number,
            shard_id: ack.shard_id,
        })
    }
}
