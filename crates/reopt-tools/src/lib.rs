//! Logging setup and memory instrumentation shared by reopt crates.

pub mod logging;
pub mod memory;

pub use logging::{LogFormat, LoggingConfig, LoggingError, init_logging};
pub use memory::{MemoryError, RssSample, StageMemory, current_rss_bytes};
