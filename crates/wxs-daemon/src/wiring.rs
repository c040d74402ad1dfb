//! Long-lived clients, built once from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use wxs_alerts::{alerting_consumer, AlertDispatcher};
use wxs_archive::{archival_consumer, ArchiveWriter};
use wxs_config::AppConfig;
use wxs_core::{NotificationTransport, SystemClock, TelemetrySource};
use wxs_http::Consumers;
use wxs_ingest::{Producer, ProviderClient, SimulatedProvider, StreamPublisher};
use wxs_sinks::{FsObjectStore, LogNotifier, MemoryStream, WebhookNotifier};

pub struct Pipeline {
    pub producer: Producer,
    pub stream: Arc<MemoryStream>,
    pub consumers: Consumers,
}

pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    let stream = Arc::new(MemoryStream::with_retention(
        config.stream.name.clone(),
        config.stream.retention,
    ));
    let publisher = StreamPublisher::new(stream.clone(), config.stream.name.clone());
    let producer = Producer::new(telemetry_source(config)?, publisher);

    let dispatcher = AlertDispatcher::new(notifier(config)?, config.alerts.topic.clone());
    let store = Arc::new(FsObjectStore::new(&config.archive.root));
    let writer = ArchiveWriter::new(store, config.archive.bucket.clone());

    let consumers = Consumers {
        alerting: Arc::new(alerting_consumer(config.thresholds, dispatcher)),
        archival: Arc::new(archival_consumer(writer, Arc::new(SystemClock))),
    };

    Ok(Pipeline {
        producer,
        stream,
        consumers,
    })
}

fn telemetry_source(config: &AppConfig) -> Result<Arc<dyn TelemetrySource>> {
    let provider = &config.provider;
    if !config.has_provider_key() {
        warn!("TOMORROW_API_KEY not set, using simulated provider");
        return Ok(Arc::new(SimulatedProvider::new(
            provider.latitude,
            provider.longitude,
        )));
    }

    let client = ProviderClient::new(
        &provider.endpoint,
        provider.latitude,
        provider.longitude,
        &provider.api_key,
    )
    .context("Failed to build provider client")?;
    info!(endpoint = %client.endpoint(), "Using realtime provider");
    Ok(Arc::new(client))
}

fn notifier(config: &AppConfig) -> Result<Arc<dyn NotificationTransport>> {
    match config.alerts.webhook_url.as_deref() {
        Some(url) => {
            let notifier = WebhookNotifier::new(url).context("Failed to build webhook notifier")?;
            info!(url, "Alerts delivered by webhook");
            Ok(Arc::new(notifier))
        }
        None => {
            info!("No ALERT_WEBHOOK_URL, alerts are logged only");
            Ok(Arc::new(LogNotifier::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxs_core::{BatchProcessor, StreamBatch, StreamRecord};

    fn config(root: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.archive.bucket = "weather-raw".into();
        config.archive.root = root.to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn simulated_pipeline_archives_to_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = build_pipeline(&config(dir.path())).unwrap();

        let handle = pipeline.producer.run_once().await.unwrap();
        assert_eq!(handle.sequence_number, 1);
        assert_eq!(pipeline.stream.len().await, 1);

        let batch = pipeline
            .stream
            .read_batch(wxs_core::PARTITION_KEY, None, 10)
            .await;
        let report = pipeline.consumers.archival.process_batch(&batch).await;
        assert_eq!(report.count("archived"), 1);
        assert!(dir.path().join("weather-raw").join("raw").is_dir());
    }

    #[tokio::test]
    async fn log_notifier_accepts_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = build_pipeline(&config(dir.path())).unwrap();

        let batch = StreamBatch::new(vec![StreamRecord::new(
            1,
            r#"{"data":{"values":{"windGust":3.0}}}"#,
        )]);
        let report = pipeline.consumers.alerting.process_batch(&batch).await;
        assert_eq!(report.count("alerted"), 1);
    }

    #[test]
    fn bad_provider_endpoint_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.provider.api_key = "k".into();
        config.provider.endpoint = "::nope::".into();
        assert!(build_pipeline(&config).is_err());
    }

    #[test]
    fn empty_webhook_url_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.alerts.webhook_url = Some(String::new());
        assert!(build_pipeline(&config).is_err());
    }
}
