use tracing::debug;
use wxs_core::{
    breaches, evaluate, Decision, DecodedPayload, Observation, PipelineResult, RecordHandler,
    RecordOutcome, ThresholdConfig,
};

use crate::AlertDispatcher;

/// Evaluate → dispatch stage of the alerting consumer
pub struct AlertHandler {
    thresholds: ThresholdConfig,
    dispatcher: AlertDispatcher,
}

impl AlertHandler {
    pub fn new(thresholds: ThresholdConfig, dispatcher: AlertDispatcher) -> Self {
        Self {
            thresholds,
            dispatcher,
        }
    }
}

#[async_trait::async_trait]
impl RecordHandler for AlertHandler {
    fn name(&self) -> &'static str {
        "alerting"
    }

    async fn handle(&self, payload: DecodedPayload) -> PipelineResult<RecordOutcome> {
        let Some(observation) = Observation::from_payload(&payload) else {
            debug!(empty = payload.is_empty(), "No metric values in record");
            return Ok(RecordOutcome::NoMetrics);
        };

        match evaluate(&observation, &self.thresholds) {
            Decision::NoAlert => Ok(RecordOutcome::BelowThresholds),
            Decision::Alert(message) => {
                let breached: Vec<&str> = breaches(&observation, &self.thresholds)
                    .iter()
                    .map(|m| m.name())
                    .collect();
                debug!(?breached, "Threshold breached");
                self.dispatcher
                    .dispatch(&message)
                    .await
                    .map(RecordOutcome::Alerted)
            }
        }
    }
}
