//! Producer side of the pipeline
//!
//! Fetches one weather snapshot per invocation and appends it, unchanged,
//! to the stream. Failures here are fatal to the invocation; retry and
//! backoff belong to whatever schedules the producer.

pub mod producer;
pub mod provider;
pub mod publisher;
pub mod simulator;

pub use producer::*;
pub use provider::*;
pub use publisher::*;
pub use simulator::*;

use thiserror::Error;

/// Errors raised while constructing producer components
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;
