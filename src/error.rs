//! Error types for the registry and configuration layers.
//!
//! The context record itself never fails; these cover lookup, locking
//! and file handling around it.

use thiserror::Error;
use crate::config::loader::ConfigError;
use crate::context::ServiceType;

#[derive(Debug, Error)]
pub enum ContextError {
    /// No context is provisioned for the service type.
    #[error("Unknown service type: {0}")]
    UnknownServiceType(ServiceType),

    /// A thread panicked while holding the context lock.
    #[error("Context lock poisoned for service type {0}")]
    Poisoned(ServiceType),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ContextError>;
