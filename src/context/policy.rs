//! Reporting of caller-contract violations.
//!
//! Two hazards are detectable inside a context: decrementing the permanent
//! failure budget below zero, and a state change off the intended graph.
//! Both are handled by the same policy so the behaviour is consistent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractPolicy {
    /// Panic on violation.
    Assert,
    /// Log a warning and continue. Transitions are applied, the budget
    /// is clamped at zero.
    Warn,
}

impl ContractPolicy {
    /// `Assert` in debug builds, `Warn` in release builds.
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            ContractPolicy::Assert
        } else {
            ContractPolicy::Warn
        }
    }
}

impl Default for ContractPolicy {
    fn default() -> Self {
        Self::for_build()
    }
}
