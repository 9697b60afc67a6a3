//! Connection state of a context.
//!
//! # State Transitions
//! ```text
//! Idle → Connecting | Scanning | Failed
//! Connecting | Scanning → Connected
//! Connected → Disconnecting | Failed
//! Disconnecting → Idle | Failed
//! Connecting | Scanning | Retrying → Failed | Retrying | Disconnecting | Idle
//! Failed → Idle | Connecting | Scanning
//! ```
//!
//! Failed is reachable from every state. The context never rejects a
//! transition; the graph only decides whether a caller broke the intended
//! sequence, which is reported per `ContractPolicy`.

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Scanning,
    Connected,
    Disconnecting,
    Failed,
    Retrying,
}

impl ConnectionState {
    /// True when no attempt is running and no connection is held.
    pub fn is_quiescent(self) -> bool {
        matches!(self, ConnectionState::Idle | ConnectionState::Failed)
    }

    /// Whether `self → next` is an edge of the intended transition graph.
    /// Re-entering the current state is always allowed.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        if self == next || next == Failed {
            return true;
        }
        match self {
            Idle => matches!(next, Connecting | Scanning),
            Connecting | Scanning | Retrying => match next {
                Connected => self != Retrying,
                Connecting | Scanning | Failed | Retrying | Disconnecting | Idle => true,
            },
            Connected => next == Disconnecting,
            Disconnecting => next == Idle,
            Failed => matches!(next, Idle | Connecting | Scanning),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "IDLE",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Scanning => "SCANNING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Disconnecting => "DISCONNECTING",
            ConnectionState::Failed => "FAILED",
            ConnectionState::Retrying => "RETRYING",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
