//! Serializes archive records into the object store

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use wxs_core::{
    is_success_status, ArchiveRecord, ObjectStore, PipelineError, PipelineResult,
    PutObjectRequest, WriteReceipt, ARCHIVE_CONTENT_TYPE,
};

pub struct ArchiveWriter {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Store the record's JSON under its key.
    ///
    /// Both a transport error and a non-success acknowledgment come back as
    /// [`PipelineError::WriteFailed`] for the caller to log.
    #[instrument(skip(self, record), fields(bucket = %self.bucket, key = %record.key))]
    pub async fn write(&self, record: &ArchiveRecord) -> PipelineResult<WriteReceipt> {
        let body = serde_json::to_string(&record.body)
            .map_err(|e| PipelineError::WriteFailed(e.to_string()))?;

        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: record.key.clone(),
            body,
            content_type: ARCHIVE_CONTENT_TYPE.to_string(),
        };

        let ack = match self.store.put_object(request).await {
            Ok(ack) => ack,
            Err(e) => {
                error!(error = %e, "Error sending data to object store");
                return Err(match e {
                    PipelineError::WriteFailed(_) => e,
                    other => PipelineError::WriteFailed(other.to_string()),
                });
            }
        };

        if !is_success_status(ack.status) {
            warn!(status = ack.status, "Object store rejected archive write");
            return Err(PipelineError::WriteFailed(format!(
                "object store answered {}",
                ack.status
            )));
        }

        info!(status = ack.status, "Record archived");
        Ok(WriteReceipt {
            key: record.key.clone(),
            status: ack.status,
        })
    }
}
