//! Per-service-type connection context bookkeeping.
//!
//! A `ConnectionContext` tracks one logical data connection (default
//! internet, MMS, ...): its state, the ordered candidate configurations left
//! to try, the permanent failure budget, and readiness gating. The
//! `ContextRegistry` holds one context per service type for an orchestrator.

pub mod config;
pub mod context;
pub mod error;
pub mod observability;
pub mod registry;

pub use config::ProvisioningConfig;
pub use context::{
    CandidateConfig, ConnectionContext, ConnectionState, ContextSnapshot, ContractPolicy,
    PendingAction, RetryToken, ServiceType,
};
pub use error::ContextError;
pub use registry::ContextRegistry;
