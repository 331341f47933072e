//! Structured logging for Docent.
//!
//! Console and rolling JSON file output, log redaction, and service event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, ServiceEvent, ServiceEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
