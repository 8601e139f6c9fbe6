//! Structured logging.

mod format;

pub use format::{FindingLine, StructuredLogger};
