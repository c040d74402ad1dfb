//! Producer tick and consumer pumps

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use wxs_core::{BatchProcessor, PARTITION_KEY};
use wxs_http::{AppState, Consumers};
use wxs_ingest::Producer;
use wxs_sinks::{MemoryStream, StreamCursor};

/// One consumer with its own read position
struct ConsumerPump {
    consumer: Arc<dyn BatchProcessor>,
    cursor: StreamCursor,
}

/// What one tick did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Sequence number of the published snapshot, if the producer succeeded
    pub published: Option<u64>,
    pub alerting_records: usize,
    pub archival_records: usize,
}

pub struct Scheduler {
    producer: Producer,
    stream: Arc<MemoryStream>,
    alerting: ConsumerPump,
    archival: ConsumerPump,
    state: Arc<AppState>,
    poll_interval: Duration,
    batch_size: usize,
}

impl Scheduler {
    pub fn new(
        producer: Producer,
        stream: Arc<MemoryStream>,
        consumers: Consumers,
        state: Arc<AppState>,
        poll_interval: Duration,
        batch_size: usize,
    ) -> Self {
        Self {
            producer,
            stream,
            alerting: ConsumerPump {
                consumer: consumers.alerting,
                cursor: StreamCursor::new(PARTITION_KEY),
            },
            archival: ConsumerPump {
                consumer: consumers.archival,
                cursor: StreamCursor::new(PARTITION_KEY),
            },
            state,
            poll_interval,
            batch_size: batch_size.max(1),
        }
    }

    /// Tick until `shutdown` flips. A tick in progress is always finished.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            batch_size = self.batch_size,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Scheduler stopped");
    }

    /// Run the producer once, drain both consumers, then release what
    /// both have consumed.
    ///
    /// A failed producer run is counted and logged; the consumers still
    /// catch up on whatever is already in the stream.
    pub async fn tick(&mut self) -> TickReport {
        let published = match self.producer.run_once().await {
            Ok(handle) => {
                wxs_http::observe_producer_run(&self.state, "ok");
                Some(handle.sequence_number)
            }
            Err(e) => {
                wxs_http::observe_producer_run(&self.state, e.kind());
                None
            }
        };

        let alerting_records =
            pump(&self.stream, &self.state, &mut self.alerting, self.batch_size).await;
        let archival_records =
            pump(&self.stream, &self.state, &mut self.archival, self.batch_size).await;

        // Records both consumers have passed are no longer needed
        if let (Some(a), Some(b)) = (
            self.alerting.cursor.last_sequence(),
            self.archival.cursor.last_sequence(),
        ) {
            self.stream.trim_through(PARTITION_KEY, a.min(b)).await;
        }

        TickReport {
            published,
            alerting_records,
            archival_records,
        }
    }
}

/// Deliver batches until the cursor is caught up; returns records delivered
async fn pump(
    stream: &MemoryStream,
    state: &AppState,
    pump: &mut ConsumerPump,
    batch_size: usize,
) -> usize {
    let mut delivered = 0;
    loop {
        let batch = pump.cursor.next_batch(stream, batch_size).await;
        if batch.is_empty() {
            break;
        }
        let report = wxs_http::deliver(state, pump.consumer.as_ref(), &batch).await;
        delivered += report.processed();
        // The batch was iterated, so it counts as accepted regardless of per-record results
        pump.cursor.advance(&batch);
    }
    if delivered > 0 {
        debug!(
            consumer = pump.consumer.name(),
            delivered,
            last_sequence = ?pump.cursor.last_sequence(),
            "Consumer caught up"
        );
    }
    delivered
}
