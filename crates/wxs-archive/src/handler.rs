use std::sync::Arc;

use wxs_core::{
    archive_key, ArchiveRecord, Clock, DecodedPayload, PipelineResult, RecordHandler,
    RecordOutcome,
};

use crate::ArchiveWriter;

/// Key → write stage of the archival consumer.
///
/// Empty payloads are archived too, as the empty-payload marker object.
pub struct ArchiveHandler {
    writer: ArchiveWriter,
    clock: Arc<dyn Clock>,
}

impl ArchiveHandler {
    pub fn new(writer: ArchiveWriter, clock: Arc<dyn Clock>) -> Self {
        Self { writer, clock }
    }
}

#[async_trait::async_trait]
impl RecordHandler for ArchiveHandler {
    fn name(&self) -> &'static str {
        "archival"
    }

    async fn handle(&self, payload: DecodedPayload) -> PipelineResult<RecordOutcome> {
        let record = ArchiveRecord {
            key: archive_key(self.clock.now()),
            body: payload.to_json(),
        };
        self.writer.write(&record).await.map(RecordOutcome::Archived)
    }
}
