//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ConnectionContext setters, registry, config
//!     → tracing events (log_tag, service_type, previous/next state, reason)
//!     → logging.rs subscriber (stdout)
//! ```

pub mod logging;
