//! Well-known reason tags.
//!
//! The reason on a context is free-form; these are the values the
//! orchestrator commonly records.

pub const DATA_ENABLED: &str = "dataEnabled";
pub const DATA_DISABLED: &str = "dataDisabled";
pub const CANDIDATE_FAILED: &str = "candidateFailed";
pub const NETWORK_LOST: &str = "networkLost";

/// Reason assigned to every freshly constructed context.
pub const DEFAULT: &str = DATA_ENABLED;
