//! Alerting consumer
//!
//! Evaluates every stream record against the configured thresholds and
//! publishes one alert per breaching record.

pub mod dispatcher;
pub mod handler;

pub use dispatcher::*;
pub use handler::*;

use wxs_core::{BatchConsumer, ThresholdConfig};

pub type AlertingConsumer = BatchConsumer<AlertHandler>;

/// Build the alerting consumer around a dispatcher
pub fn alerting_consumer(thresholds: ThresholdConfig, dispatcher: AlertDispatcher) -> AlertingConsumer {
    BatchConsumer::new(AlertHandler::new(thresholds, dispatcher))
}
