//! HTTP surface: health, readiness, Prometheus metrics and batch delivery
//! for both stream consumers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use opentelemetry::{
    metrics::{Counter, MeterProvider},
    KeyValue,
};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use wxs_core::{BatchProcessor, BatchReport, StreamBatch, StreamRecord};

/// The two consumers reachable over HTTP
#[derive(Clone)]
pub struct Consumers {
    pub alerting: Arc<dyn BatchProcessor>,
    pub archival: Arc<dyn BatchProcessor>,
}

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    batches_total: Counter<u64>,
    records_total: Counter<u64>,
    producer_runs_total: Counter<u64>,
    consumers: Consumers,
}

pub fn build_app(consumers: Consumers) -> Result<(Router, Arc<AppState>)> {
    let registry = Registry::new();
    let reader = exporter().with_registry(registry.clone()).build()?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wxs-http");

    let batches_total = meter
        .u64_counter("wxs_batches_total")
        .with_description("Batches delivered to a consumer")
        .init();
    let records_total = meter
        .u64_counter("wxs_records_total")
        .with_description("Records processed by a consumer, by outcome")
        .init();
    let producer_runs_total = meter
        .u64_counter("wxs_producer_runs_total")
        .with_description("Producer invocations, by status")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        batches_total,
        records_total,
        producer_runs_total,
        consumers,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/invoke/alerting", post(invoke_alerting))
        .route("/invoke/archival", post(invoke_archival))
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Count one batch and each of its records by outcome
pub fn observe_batch(state: &AppState, consumer: &'static str, report: &BatchReport) {
    state
        .batches_total
        .add(1, &[KeyValue::new("consumer", consumer)]);
    for record in &report.records {
        state.records_total.add(
            1,
            &[
                KeyValue::new("consumer", consumer),
                KeyValue::new("outcome", record.label()),
            ],
        );
    }
}

/// `status` is "ok" or a pipeline error kind
pub fn observe_producer_run(state: &AppState, status: &'static str) {
    state
        .producer_runs_total
        .add(1, &[KeyValue::new("status", status)]);
}

/// Run a batch through a consumer and record its metrics
pub async fn deliver(
    state: &AppState,
    consumer: &dyn BatchProcessor,
    batch: &StreamBatch,
) -> BatchReport {
    let report = consumer.process_batch(batch).await;
    observe_batch(state, consumer.name(), &report);
    report
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> ([(HeaderName, HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        warn!(error = ?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

/// Batch envelope as delivered by the stream
#[derive(Debug, Default, Deserialize)]
struct DeliveryEnvelope {
    #[serde(default)]
    records: Vec<DeliveredRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveredRecord {
    sequence_number: u64,
    /// Payload text; absent or null is an empty payload
    #[serde(default)]
    data: Option<String>,
}

impl DeliveryEnvelope {
    fn into_batch(self) -> StreamBatch {
        StreamBatch::new(
            self.records
                .into_iter()
                .map(|r| StreamRecord::new(r.sequence_number, r.data.unwrap_or_default()))
                .collect(),
        )
    }
}

async fn invoke_alerting(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let consumer = Arc::clone(&state.consumers.alerting);
    invoke(&state, consumer.as_ref(), &body).await
}

async fn invoke_archival(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let consumer = Arc::clone(&state.consumers.archival);
    invoke(&state, consumer.as_ref(), &body).await
}

async fn invoke(
    state: &AppState,
    consumer: &dyn BatchProcessor,
    body: &[u8],
) -> axum::response::Response {
    let envelope: DeliveryEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(consumer = consumer.name(), error = %e, "Rejected batch envelope");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "rejected", "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let batch = envelope.into_batch();
    let report = deliver(state, consumer, &batch).await;
    info!(
        consumer = consumer.name(),
        processed = report.processed(),
        failed = report.failed(),
        "Batch accepted"
    );

    (
        StatusCode::OK,
        Json(json!({
            "status": "accepted",
            "processed": report.processed(),
            "failed": report.failed(),
        })),
    )
        .into_response()
}
