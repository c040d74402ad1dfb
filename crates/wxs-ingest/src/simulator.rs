//! Simulated provider for running without an API key

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use wxs_core::{PipelineResult, TelemetrySource};

/// Generates provider-shaped snapshots with synthetic values
pub struct SimulatedProvider {
    latitude: f64,
    longitude: f64,
}

impl SimulatedProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn generate_snapshot(&self, now: chrono::DateTime<Utc>) -> serde_json::Value {
        // Slow drift so consecutive snapshots differ
        let variation = ((now.timestamp() % 100) as f64 / 10.0) - 5.0;

        json!({
            "data": {
                "time": now.to_rfc3339_opts(SecondsFormat::Secs, true),
                "values": {
                    "precipitationProbability": (50.0 + variation * 8.0).round(),
                    "windSpeed": 6.0 + variation.abs(),
                    "windGust": 10.0 + variation.abs() * 2.0,
                    "rainIntensity": (variation + 5.0) / 2.0,
                    "temperature": 20.0 + variation,
                    "humidity": 65.0 + variation
                }
            },
            "location": {
                "lat": self.latitude,
                "lon": self.longitude,
                "type": "simulated"
            }
        })
    }
}

#[async_trait::async_trait]
impl TelemetrySource for SimulatedProvider {
    async fn fetch_snapshot(&self) -> PipelineResult<String> {
        Ok(self.generate_snapshot(Utc::now()).to_string())
    }
}
