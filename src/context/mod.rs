//! Per-service-type connection context.
//!
//! # Data Flow
//! ```text
//! Orchestrator resolves candidates
//!     → record.rs set_candidates (budget = len)
//!     → peek_next_candidate → attempt connection (external)
//!     → on permanent failure: decrement_failure_budget + dequeue_candidate
//!     → budget == 0: no viable candidate remains
//!     → set_state(Failed) clears the queue
//!
//! Readiness:
//!     set_enabled + set_dependency_met → is_ready()
//! ```
//!
//! # Design Decisions
//! - The context is a passive record; sequencing belongs to the orchestrator
//! - Handles (connection, retry) are typed ids, never owned resources
//! - Contract violations follow one `ContractPolicy` for all hazards

pub mod candidate;
pub mod handle;
pub mod pending;
pub mod policy;
pub mod reason;
pub mod record;
pub mod state;

pub use candidate::{AuthType, CandidateConfig, CandidateQueue, IpProtocol};
pub use handle::{ConnectionId, RetryToken, ServiceType};
pub use pending::PendingAction;
pub use policy::ContractPolicy;
pub use record::{ConnectionContext, ContextSnapshot};
pub use state::ConnectionState;
