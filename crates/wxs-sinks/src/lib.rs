//! Concrete transports behind the pipeline's external-interface traits

pub mod fs;
pub mod log;
pub mod memory;
pub mod stream;
#[cfg(feature = "webhook")]
pub mod webhook;

pub use fs::*;
pub use log::*;
pub use memory::*;
pub use stream::*;
#[cfg(feature = "webhook")]
pub use webhook::*;
