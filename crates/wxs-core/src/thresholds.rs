//! Threshold evaluation
//!
//! A record alerts when ANY one metric is `>=` its limit. There is no
//! hysteresis and no suppression: every breaching record yields one alert.

use crate::{AlertMessage, Observation, ThresholdConfig, ALERT_SUBJECT};

/// Metric identifiers, in the order they appear in an alert body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PrecipitationProbability,
    WindSpeed,
    WindGust,
    RainIntensity,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PrecipitationProbability,
        Metric::WindSpeed,
        Metric::WindGust,
        Metric::RainIntensity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::PrecipitationProbability => "precipitation_probability",
            Metric::WindSpeed => "wind_speed",
            Metric::WindGust => "wind_gust",
            Metric::RainIntensity => "rain_intensity",
        }
    }

    fn value(&self, obs: &Observation) -> f64 {
        match self {
            Metric::PrecipitationProbability => obs.precipitation_probability,
            Metric::WindSpeed => obs.wind_speed,
            Metric::WindGust => obs.wind_gust,
            Metric::RainIntensity => obs.rain_intensity,
        }
    }

    fn limit(&self, cfg: &ThresholdConfig) -> u32 {
        match self {
            Metric::PrecipitationProbability => cfg.precipitation_probability,
            Metric::WindSpeed => cfg.wind_speed,
            Metric::WindGust => cfg.wind_gust,
            Metric::RainIntensity => cfg.rain_intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Alert(AlertMessage),
    NoAlert,
}

/// Metrics at or above their configured limit
pub fn breaches(obs: &Observation, cfg: &ThresholdConfig) -> Vec<Metric> {
    Metric::ALL
        .into_iter()
        .filter(|m| m.value(obs) >= f64::from(m.limit(cfg)))
        .collect()
}

pub fn evaluate(obs: &Observation, cfg: &ThresholdConfig) -> Decision {
    if breaches(obs, cfg).is_empty() {
        Decision::NoAlert
    } else {
        Decision::Alert(compose_alert(obs))
    }
}

/// Four-line summary of the observation under the fixed subject
pub fn compose_alert(obs: &Observation) -> AlertMessage {
    let body = format!(
        "Probabilidade de Chuva: {}%\n\
         Velocidade do Vento: {} m/s\n\
         Rajada de Vento: {} m/s\n\
         Intensidade da Chuva: {} mm/h\n",
        obs.precipitation_probability, obs.wind_speed, obs.wind_gust, obs.rain_intensity
    );
    AlertMessage {
        subject: ALERT_SUBJECT.to_string(),
        body,
    }
}
