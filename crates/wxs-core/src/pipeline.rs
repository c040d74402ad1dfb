use chrono::NaiveDateTime;

use crate::{
    PipelineResult, PublishAck, PublishRequest, PutObjectAck, PutObjectRequest, PutRecordAck,
    PutRecordRequest,
};

/// Upstream weather provider; returns one snapshot as raw JSON text
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_snapshot(&self) -> PipelineResult<String>;
}

/// Ordered, at-least-once append log
#[async_trait::async_trait]
pub trait StreamTransport: Send + Sync {
    async fn put_record(&self, request: PutRecordRequest) -> PipelineResult<PutRecordAck>;
}

/// Fire-and-forget publish sink
#[async_trait::async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn publish(&self, request: PublishRequest) -> PipelineResult<PublishAck>;
}

/// Key/value blob sink
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, request: PutObjectRequest) -> PipelineResult<PutObjectAck>;
}

/// Wall-clock source for archive keys
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local processing time of this process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
