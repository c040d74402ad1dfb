//! Records, batches, and the request/acknowledgment shapes exchanged with
//! the external collaborators

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every record is appended under this one partition key, so the whole
/// stream is a single totally ordered partition.
pub const PARTITION_KEY: &str = "1";

/// Subject line of every alert
pub const ALERT_SUBJECT: &str = "Alerta Meteorológico";

/// Content type of archived objects
pub const ARCHIVE_CONTENT_TYPE: &str = "application/json";

/// HTTP-style acknowledgment check used for every transport status
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// One record as delivered by the stream transport
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    /// Position within the partition (strictly increasing)
    pub sequence_number: u64,
    pub partition_key: String,
    /// Opaque payload, expected to be UTF-8 JSON text
    pub payload: Vec<u8>,
}

impl StreamRecord {
    pub fn new(sequence_number: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            sequence_number,
            partition_key: PARTITION_KEY.to_string(),
            payload: payload.into(),
        }
    }
}

/// Records delivered together to one consumer invocation, in delivery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamBatch {
    pub records: Vec<StreamRecord>,
}

impl StreamBatch {
    pub fn new(records: Vec<StreamRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequence number of the last record, used to advance a consumer cursor
    pub fn last_sequence_number(&self) -> Option<u64> {
        self.records.last().map(|r| r.sequence_number)
    }
}

/// Where a published snapshot landed in the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    pub sequence_number: u64,
    pub shard_id: String,
}

/// Severity limits, fixed for the lifetime of the process.
///
/// A limit of 0 breaches on every observation because every metric is >= 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Precipitation probability, in percent
    pub precipitation_probability: u32,
    /// Wind speed, m/s
    pub wind_speed: u32,
    /// Wind gust, m/s
    pub wind_gust: u32,
    /// Rain intensity, mm/h
    pub rain_intensity: u32,
}

/// Alert composed from one observation
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// A decoded record together with the key it will be stored under
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRecord {
    pub key: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub message_id: Option<String>,
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub key: String,
    pub status: u16,
}

// ---------------------------------------------------------------------------
// External interface shapes
// ---------------------------------------------------------------------------

/// Stream append request
#[derive(Debug, Clone, PartialEq)]
pub struct PutRecordRequest {
    pub stream_name: String,
    pub partition_key: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordAck {
    pub status: u16,
    pub sequence_number: u64,
    pub shard_id: String,
}

/// Notification publish request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub topic: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    pub message_id: Option<String>,
    pub status: u16,
}

/// Object store put request
#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectAck {
    pub status: u16,
}
