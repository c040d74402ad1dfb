use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use wxs_alerts::{alerting_consumer, AlertDispatcher};
use wxs_archive::{archival_consumer, ArchiveWriter};
use wxs_core::{FixedClock, ThresholdConfig};
use wxs_http::{build_app, set_ready, AppState, Consumers};
use wxs_sinks::{MemoryNotifier, MemoryObjectStore};

struct Fixture {
    app: Router,
    state: Arc<AppState>,
    notifier: Arc<MemoryNotifier>,
    store: Arc<MemoryObjectStore>,
}

fn fixture() -> Fixture {
    let notifier = Arc::new(MemoryNotifier::new());
    let store = Arc::new(MemoryObjectStore::new());
    let thresholds = ThresholdConfig {
        precipitation_probability: 80,
        wind_speed: 15,
        wind_gust: 25,
        rain_intensity: 10,
    };
    let clock = FixedClock(
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 22, 7)
            .unwrap(),
    );

    let consumers = Consumers {
        alerting: Arc::new(alerting_consumer(
            thresholds,
            AlertDispatcher::new(notifier.clone(), "weather-alerts"),
        )),
        archival: Arc::new(archival_consumer(
            ArchiveWriter::new(store.clone(), "weather-raw"),
            Arc::new(clock),
        )),
    };
    let (app, state) = build_app(consumers).unwrap();
    Fixture {
        app,
        state,
        notifier,
        store,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn post(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn mixed_batch() -> String {
    json!({
        "records": [
            { "sequenceNumber": 1, "data": "{\"data\": {\"values\": " },
            { "sequenceNumber": 2, "data": r#"{"data":{"values":{"precipitationProbability":10,"windSpeed":3.2,"windGust":6.1,"rainIntensity":0}}}"# },
            { "sequenceNumber": 3, "data": r#"{"data":{"values":{"precipitationProbability":10,"windSpeed":3.2,"windGust":27.4,"rainIntensity":0}}}"# }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn health_and_readiness() {
    let fx = fixture();

    assert_eq!(get(&fx.app, "/healthz").await.0, StatusCode::OK);
    assert_eq!(
        get(&fx.app, "/readyz").await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );

    set_ready(&fx.state, true);
    assert_eq!(get(&fx.app, "/readyz").await.0, StatusCode::OK);
}

#[tokio::test]
async fn alerting_batch_is_accepted_despite_bad_record() {
    let fx = fixture();

    let (status, body) = post(&fx.app, "/invoke/alerting", mixed_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "accepted", "processed": 3, "failed": 1 })
    );
    assert_eq!(fx.notifier.published().len(), 1);
    assert!(fx.store.is_empty());
}

#[tokio::test]
async fn archival_batch_writes_each_decodable_record() {
    let fx = fixture();

    let (status, body) = post(&fx.app, "/invoke/archival", mixed_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "accepted", "processed": 3, "failed": 1 })
    );
    // Fixed clock: both decodable records land on the same key
    assert_eq!(
        fx.store.keys("weather-raw"),
        vec!["raw/year=2024/month=3/day=5/weather_data_05-03-2024-14:22:07.json".to_string()]
    );
    assert!(fx.notifier.published().is_empty());
}

#[tokio::test]
async fn empty_and_missing_records_short_circuit() {
    let fx = fixture();

    for body in [r#"{"records":[]}"#, "{}"] {
        let (status, json_body) = post(&fx.app, "/invoke/alerting", body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body,
            json!({ "status": "accepted", "processed": 0, "failed": 0 })
        );
    }
    assert!(fx.notifier.published().is_empty());
}

#[tokio::test]
async fn unparseable_envelope_is_rejected() {
    let fx = fixture();

    let (status, body) = post(&fx.app, "/invoke/archival", "not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "rejected");
    assert!(fx.store.is_empty());
}

#[tokio::test]
async fn metrics_count_batches_and_outcomes() {
    let fx = fixture();
    post(&fx.app, "/invoke/alerting", mixed_batch()).await;
    wxs_http::observe_producer_run(&fx.state, "ok");

    let (status, text) = get(&fx.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("wxs_batches_total"));
    assert!(text.contains("wxs_records_total"));
    assert!(text.contains("wxs_producer_runs_total"));
    assert!(text.contains(r#"outcome="alerted""#));
    assert!(text.contains(r#"outcome="malformed_payload""#));
    assert!(text.contains(r#"consumer="alerting""#));
}
