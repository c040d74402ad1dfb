//! In-process ordered stream log

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::{debug, warn};
use wxs_core::{
    PipelineResult, PutRecordAck, PutRecordRequest, StreamBatch, StreamRecord, StreamTransport,
};

pub const SHARD_ID: &str = "shardId-000000000000";

/// Records kept per partition unless configured otherwise
pub const DEFAULT_RETENTION: usize = 10_000;

/// Append log keyed by partition, with bounded retention.
///
/// Sequence numbers are assigned under the write lock, so within a
/// partition they increase strictly in append order. Records leave the
/// log when every reader has moved past them ([`MemoryStream::trim_through`])
/// or, oldest first, once a partition holds more than `retention` records.
pub struct MemoryStream {
    stream_name: String,
    retention: usize,
    inner: RwLock<StreamState>,
}

#[derive(Default)]
struct StreamState {
    next_sequence: u64,
    partitions: HashMap<String, VecDeque<StreamRecord>>,
}

impl MemoryStream {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self::with_retention(stream_name, DEFAULT_RETENTION)
    }

    pub fn with_retention(stream_name: impl Into<String>, retention: usize) -> Self {
        Self {
            stream_name: stream_name.into(),
            retention: retention.max(1),
            inner: RwLock::new(StreamState::default()),
        }
    }

    /// Up to `max` records after `after_sequence`, in append order
    pub async fn read_batch(
        &self,
        partition_key: &str,
        after_sequence: Option<u64>,
        max: usize,
    ) -> StreamBatch {
        let state = self.inner.read().await;
        let Some(records) = state.partitions.get(partition_key) else {
            return StreamBatch::default();
        };
        let start = match after_sequence {
            Some(after) => records.partition_point(|r| r.sequence_number <= after),
            None => 0,
        };
        StreamBatch::new(records.range(start..).take(max).cloned().collect())
    }

    /// Drop every record of the partition at or below `sequence`.
    ///
    /// Returns how many records were dropped.
    pub async fn trim_through(&self, partition_key: &str, sequence: u64) -> usize {
        let mut state = self.inner.write().await;
        let Some(records) = state.partitions.get_mut(partition_key) else {
            return 0;
        };
        let consumed = records.partition_point(|r| r.sequence_number <= sequence);
        records.drain(..consumed);
        if consumed > 0 {
            debug!(partition_key, through = sequence, dropped = consumed, "Stream trimmed");
        }
        consumed
    }

    /// Number of records across all partitions
    pub async fn len(&self) -> usize {
        let state = self.inner.read().await;
        state.partitions.values().map(VecDeque::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl StreamTransport for MemoryStream {
    async fn put_record(&self, request: PutRecordRequest) -> PipelineResult<PutRecordAck> {
        if request.stream_name != self.stream_name {
            return Ok(PutRecordAck {
                status: 400,
                sequence_number: 0,
                shard_id: SHARD_ID.to_string(),
            });
        }

        let mut state = self.inner.write().await;
        state.next_sequence += 1;
        let sequence_number = state.next_sequence;
        let records = state
            .partitions
            .entry(request.partition_key.clone())
            .or_default();
        records.push_back(StreamRecord {
            sequence_number,
            partition_key: request.partition_key,
            payload: request.data,
        });

        if records.len() > self.retention {
            let overflow = records.len() - self.retention;
            records.drain(..overflow);
            warn!(
                stream = %self.stream_name,
                dropped = overflow,
                retention = self.retention,
                "Stream retention exceeded, oldest records dropped"
            );
        }

        Ok(PutRecordAck {
            status: 200,
            sequence_number,
            shard_id: SHARD_ID.to_string(),
        })
    }
}

/// A consumer's read position within one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCursor {
    partition_key: String,
    last_sequence: Option<u64>,
}

impl StreamCursor {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            last_sequence: None,
        }
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub async fn next_batch(&self, stream: &MemoryStream, max: usize) -> StreamBatch {
        stream
            .read_batch(&self.partition_key, self.last_sequence, max)
            .await
    }

    /// Move past a batch once it has been fully iterated
    pub fn advance(&mut self, batch: &StreamBatch) {
        if let Some(last) = batch.last_sequence_number() {
            self.last_sequence = Some(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxs_core::PARTITION_KEY;

    fn put(stream: &str, data: &str) -> PutRecordRequest {
        PutRecordRequest {
            stream_name: stream.to_string(),
            partition_key: PARTITION_KEY.to_string(),
            data: data.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_appends_are_ordered() {
        let stream = MemoryStream::new("broker");
        for i in 0..5 {
            let ack = stream.put_record(put("broker", &i.to_string())).await.unwrap();
            assert_eq!(ack.status, 200);
            assert_eq!(ack.sequence_number, i + 1);
        }

        let batch = stream.read_batch(PARTITION_KEY, None, 10).await;
        let payloads: Vec<String> = batch
            .records
            .iter()
            .map(|r| String::from_utf8(r.payload.clone()).unwrap())
            .collect();
        assert_eq!(payloads, vec!["0", "1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_unknown_stream_rejected() {
        let stream = MemoryStream::new("broker");
        let ack = stream.put_record(put("other", "{}")).await.unwrap();
        assert_eq!(ack.status, 400);
        assert!(stream.is_empty().await);
    }

    #[tokio::test]
    async fn test_cursor_pages_through_partition() {
        let stream = MemoryStream::new("broker");
        for i in 0..5 {
            stream.put_record(put("broker", &i.to_string())).await.unwrap();
        }

        let mut cursor = StreamCursor::new(PARTITION_KEY);
        let first = cursor.next_batch(&stream, 2).await;
        assert_eq!(first.len(), 2);

        // Not advanced yet: the same batch is delivered again
        assert_eq!(cursor.next_batch(&stream, 2).await, first);

        cursor.advance(&first);
        let second = cursor.next_batch(&stream, 10).await;
        assert_eq!(second.len(), 3);
        assert_eq!(second.records[0].sequence_number, 3);

        cursor.advance(&second);
        assert!(cursor.next_batch(&stream, 10).await.is_empty());
        assert_eq!(cursor.last_sequence(), Some(5));

        cursor.advance(&StreamBatch::default());
        assert_eq!(cursor.last_sequence(), Some(5));
    }

    #[tokio::test]
    async fn test_consumed_backlog_is_released() {
        let stream = MemoryStream::new("broker");
        for i in 0..1000 {
            stream.put_record(put("broker", &i.to_string())).await.unwrap();
        }

        let mut fast = StreamCursor::new(PARTITION_KEY);
        let mut slow = StreamCursor::new(PARTITION_KEY);
        loop {
            let batch = fast.next_batch(&stream, 64).await;
            if batch.is_empty() {
                break;
            }
            fast.advance(&batch);
        }
        let batch = slow.next_batch(&stream, 400).await;
        slow.advance(&batch);

        // Only what both readers have passed may go
        let through = fast.last_sequence().unwrap().min(slow.last_sequence().unwrap());
        assert_eq!(stream.trim_through(PARTITION_KEY, through).await, 400);
        assert_eq!(stream.len().await, 600);

        // The slow reader resumes where it left off
        let next = slow.next_batch(&stream, 1).await;
        assert_eq!(next.records[0].sequence_number, 401);

        loop {
            let batch = slow.next_batch(&stream, 64).await;
            if batch.is_empty() {
                break;
            }
            slow.advance(&batch);
        }
        stream.trim_through(PARTITION_KEY, slow.last_sequence().unwrap()).await;
        assert!(stream.is_empty().await);
    }

    #[tokio::test]
    async fn test_retention_caps_partition() {
        let stream = MemoryStream::with_retention("broker", 3);
        for i in 0..10 {
            stream.put_record(put("broker", &i.to_string())).await.unwrap();
        }
        assert_eq!(stream.len().await, 3);

        let batch = stream.read_batch(PARTITION_KEY, None, 10).await;
        let sequences: Vec<u64> = batch.records.iter().map(|r| r.sequence_number).collect();
        assert_eq!(sequences, vec![8, 9, 10]);

        // A reader that fell behind skips what retention dropped
        let batch = stream.read_batch(PARTITION_KEY, Some(2), 10).await;
        assert_eq!(batch.records[0].sequence_number, 8);
    }

    #[tokio::test]
    async fn test_trim_unknown_partition() {
        let stream = MemoryStream::new("broker");
        assert_eq!(stream.trim_through("other", 10).await, 0);
    }
}
