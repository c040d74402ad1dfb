//! Archival consumer
//!
//! Stores every stream record as JSON under a date-partitioned key for
//! later batch analysis.

pub mod handler;
pub mod writer;

pub use handler::*;
pub use writer::*;

use std::sync::Arc;

use wxs_core::{BatchConsumer, Clock};

pub type ArchivalConsumer = BatchConsumer<ArchiveHandler>;

pub fn archival_consumer(writer: ArchiveWriter, clock: Arc<dyn Clock>) -> ArchivalConsumer {
    BatchConsumer::new(ArchiveHandler::new(writer, clock))
}
