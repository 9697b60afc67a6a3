//! Deferred orchestrator intent.

use std::fmt;
use serde::{Deserialize, Serialize};

/// What the orchestrator wants done once the in-flight operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    #[default]
    None,
    Reconnect,
    Disable,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PendingAction::None => "none",
            PendingAction::Reconnect => "reconnect",
            PendingAction::Disable => "disable",
        };
        f.write_str(s)
    }
}
