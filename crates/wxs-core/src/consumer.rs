//! Batch loop shared by both stream consumers
//!
//! Records are processed strictly one after another in delivery order.
//! Each record yields its own `Result`; the loop logs it and moves on, so a
//! batch that has been iterated is always accepted.

use tracing::{info, warn};

use crate::{
    decode, DecodedPayload, DispatchReceipt, PipelineResult, StreamBatch, StreamRecord,
    WriteReceipt,
};

/// What happened to one successfully handled record
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// An alert was dispatched
    Alerted(DispatchReceipt),
    /// Metrics were evaluated and none breached
    BelowThresholds,
    /// The payload carried no `data.values` metrics
    NoMetrics,
    /// The record was stored
    Archived(WriteReceipt),
}

impl RecordOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RecordOutcome::Alerted(_) => "alerted",
            RecordOutcome::BelowThresholds => "below_thresholds",
            RecordOutcome::NoMetrics => "no_metrics",
            RecordOutcome::Archived(_) => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    /// Index within the batch
    pub position: usize,
    pub sequence_number: u64,
    pub result: PipelineResult<RecordOutcome>,
}

impl RecordReport {
    /// Outcome label, or the error kind for failed records
    pub fn label(&self) -> &'static str {
        match &self.result {
            Ok(outcome) => outcome.label(),
            Err(e) => e.kind(),
        }
    }
}

/// Per-record results of one batch invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.result.is_err()).count()
    }

    /// Number of records whose label matches
    pub fn count(&self, label: &str) -> usize {
        self.records.iter().filter(|r| r.label() == label).count()
    }
}

/// Per-record stage behind the decoder
#[async_trait::async_trait]
pub trait RecordHandler: Send + Sync {
    /// Consumer name used in logs
    fn name(&self) -> &'static str;

    async fn handle(&self, payload: DecodedPayload) -> PipelineResult<RecordOutcome>;
}

/// Anything that accepts a delivered batch
#[async_trait::async_trait]
pub trait BatchProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process_batch(&self, batch: &StreamBatch) -> BatchReport;
}

/// Decode → handle loop over a batch
pub struct BatchConsumer<H> {
    handler: H,
}

impl<H: RecordHandler> BatchConsumer<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    async fn process_record(&self, record: &StreamRecord) -> PipelineResult<RecordOutcome> {
        let payload = decode(&record.payload)?;
        self.handler.handle(payload).await
    }
}

#[async_trait::async_trait]
impl<H: RecordHandler> BatchProcessor for BatchConsumer<H> {
    fn name(&self) -> &'static str {
        self.handler.name()
    }

    async fn process_batch(&self, batch: &StreamBatch) -> BatchReport {
        let consumer = self.handler.name();

        if batch.is_empty() {
            info!(consumer, "No records found in the batch");
            return BatchReport::default();
        }

        info!(consumer, count = batch.len(), "Beginning to process records");

        let mut report = BatchReport {
            records: Vec::with_capacity(batch.len()),
        };

        for (position, record) in batch.records.iter().enumerate() {
            let result = self.process_record(record).await;
            match &result {
                Ok(outcome) => info!(
                    consumer,
                    position,
                    sequence_number = record.sequence_number,
                    outcome = outcome.label(),
                    "Record processed"
                ),
                Err(e) => warn!(
                    consumer,
                    position,
                    sequence_number = record.sequence_number,
                    kind = e.kind(),
                    error = %e,
                    "Record failed, continuing with batch"
                ),
            }
            report.records.push(RecordReport {
                position,
                sequence_number: record.sequence_number,
                result,
            });
        }

        info!(
            consumer,
            processed = report.processed(),
            failed = report.failed(),
            "Stream processing complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;
    use std::sync::Mutex;

    /// Records every payload it sees; fails payloads containing "reject"
    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<DecodedPayload>>,
    }

    #[async_trait::async_trait]
    impl RecordHandler for RecordingHandler {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn handle(&self, payload: DecodedPayload) -> PipelineResult<RecordOutcome> {
            let reject = payload
                .tree()
                .map(|t| t.contains_key("reject"))
                .unwrap_or(false);
            self.seen.lock().unwrap().push(payload);
            if reject {
                Err(PipelineError::WriteFailed("store said no".into()))
            } else {
                Ok(RecordOutcome::NoMetrics)
            }
        }
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let consumer = BatchConsumer::new(RecordingHandler::default());
        let report = consumer.process_batch(&StreamBatch::default()).await;
        assert_eq!(report.processed(), 0);
        assert!(consumer.handler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_batch() {
        let consumer = BatchConsumer::new(RecordingHandler::default());
        let batch = StreamBatch::new(vec![
            StreamRecord::new(1, "{broken"),
            StreamRecord::new(2, r#"{"reject":true}"#),
            StreamRecord::new(3, ""),
            StreamRecord::new(4, r#"{"data":{}}"#),
        ]);

        let report = consumer.process_batch(&batch).await;

        assert_eq!(report.processed(), 4);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.count("malformed_payload"), 1);
        assert_eq!(report.count("write_failed"), 1);
        assert_eq!(report.count("no_metrics"), 2);

        let seen = consumer.handler.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[1].is_empty());
    }

    #[tokio::test]
    async fn test_report_preserves_delivery_order() {
        let consumer = BatchConsumer::new(RecordingHandler::default());
        let batch = StreamBatch::new(vec![
            StreamRecord::new(10, "{}"),
            StreamRecord::new(11, "{}"),
            StreamRecord::new(12, "{}"),
        ]);
        let report = consumer.process_batch(&batch).await;
        let order: Vec<(usize, u64)> = report
            .records
            .iter()
            .map(|r| (r.position, r.sequence_number))
            .collect();
        assert_eq!(order, vec![(0, 10), (1, 11), (2, 12)]);
    }
}
