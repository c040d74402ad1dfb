//! Core data types and stage logic for the weather stream pipeline
//!
//! This crate holds everything both stream consumers share: the record
//! and batch types, the error taxonomy, the traits at every external
//! boundary (provider, stream, notification sink, object store), and the
//! pure stages (decoding, threshold evaluation, archive key derivation)
//! plus the batch loop that drives them.

pub mod archive_key;
pub mod consumer;
pub mod decode;
pub mod error;
pub mod observation;
pub mod pipeline;
pub mod thresholds;
pub mod types;

pub use archive_key::*;
pub use consumer::*;
pub use decode::*;
pub use error::*;
pub use observation::*;
pub use pipeline::*;
pub use thresholds::*;
pub use types::*;
