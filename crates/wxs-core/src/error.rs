//! Error taxonomy shared by every pipeline stage

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// Telemetry fetch failed or the provider answered with a non-success status.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Stream append failed or was not acknowledged as a success.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Record body is not a JSON object.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Notification sink rejected the alert.
    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    /// Object store rejected the archive write.
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl PipelineError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ProviderUnavailable(_) => "provider_unavailable",
            PipelineError::PublishFailed(_) => "publish_failed",
            PipelineError::MalformedPayload(_) => "malformed_payload",
            PipelineError::DispatchFailed(_) => "dispatch_failed",
            PipelineError::WriteFailed(_) => "write_failed",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
