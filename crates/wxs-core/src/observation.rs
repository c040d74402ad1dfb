//! Metric view over a decoded payload
//!
//! Fields are read best-effort from `data.values`: a missing, null, or
//! non-numeric field reads as 0, so it can never raise a threshold on its own.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::DecodedPayload;

pub const FIELD_PRECIPITATION_PROBABILITY: &str = "precipitationProbability";
pub const FIELD_WIND_SPEED: &str = "windSpeed";
pub const FIELD_WIND_GUST: &str = "windGust";
pub const FIELD_RAIN_INTENSITY: &str = "rainIntensity";

/// The four metrics the alerting consumer looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Observation {
    pub precipitation_probability: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub rain_intensity: f64,
}

impl Observation {
    /// Extract metrics from `data.values`.
    ///
    /// Returns `None` when the payload is empty or has no `data.values`
    /// object; such records carry no metrics to evaluate.
    pub fn from_payload(payload: &DecodedPayload) -> Option<Self> {
        let tree = payload.tree()?;
        let values = tree
            .get("data")
            .and_then(|data| data.get("values"))
            .and_then(Value::as_object)?;
        Some(Self::from_values(values))
    }

    pub fn from_values(values: &Map<String, Value>) -> Self {
        Self {
            precipitation_probability: metric(values, FIELD_PRECIPITATION_PROBABILITY),
            wind_speed: metric(values, FIELD_WIND_SPEED),
            wind_gust: metric(values, FIELD_WIND_GUST),
            rain_intensity: metric(values, FIELD_RAIN_INTENSITY),
        }
    }
}

/// Read one numeric field, defaulting to 0.
///
/// Numeric strings are accepted since some provider versions quote numbers.
pub fn metric(values: &Map<String, Value>, key: &str) -> f64 {
    match values.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    #[test]
    fn test_full_observation() {
        let payload = decode(
            br#"{"data":{"time":"2024-03-05T14:00:00Z","values":{
                "precipitationProbability": 35,
                "windSpeed": 4.2,
                "windGust": 9.75,
                "rainIntensity": 0.5,
                "temperature": 21.3
            }}}"#,
        )
        .unwrap();

        let obs = Observation::from_payload(&payload).unwrap();
        assert_eq!(
            obs,
            Observation {
                precipitation_probability: 35.0,
                wind_speed: 4.2,
                wind_gust: 9.75,
                rain_intensity: 0.5,
            }
        );
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let payload = decode(br#"{"data":{"values":{"windGust":null,"windSpeed":"n/a"}}}"#).unwrap();
        let obs = Observation::from_payload(&payload).unwrap();
        assert_eq!(obs, Observation::default());
    }

    #[test]
    fn test_quoted_numbers() {
        let payload = decode(br#"{"data":{"values":{"windSpeed":" 12.5 "}}}"#).unwrap();
        let obs = Observation::from_payload(&payload).unwrap();
        assert_eq!(obs.wind_speed, 12.5);
    }

    #[test]
    fn test_no_values_object() {
        for raw in [
            &br#"{"location":{"lat":1.0}}"#[..],
            br#"{"data":{"time":"now"}}"#,
            br#"{"data":{"values":[1,2]}}"#,
            br#"{"data":"oops"}"#,
            b"null",
        ] {
            let payload = decode(raw).unwrap();
            assert_eq!(Observation::from_payload(&payload), None);
        }
    }
}
