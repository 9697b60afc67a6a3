//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check identifiers are present and unique
//! - Validate value ranges (ports, log levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProvisioningConfig → Result<(), Vec<ValidationError>>
//! - A context without any matching candidate is logged, not rejected

use std::collections::HashSet;
use thiserror::Error;
use crate::config::schema::ProvisioningConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("context #{0} has an empty service type")]
    EmptyServiceType(usize),

    #[error("service type '{0}' is provisioned more than once")]
    DuplicateServiceType(String),

    #[error("context '{0}' has an empty log tag")]
    EmptyLogTag(String),

    #[error("candidate {0} has an empty apn")]
    EmptyApn(u32),

    #[error("candidate id {0} is used more than once")]
    DuplicateCandidateId(u32),

    #[error("candidate {0} lists no service types")]
    NoServiceTypes(u32),

    #[error("candidate {0} has port 0")]
    InvalidPort(u32),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

pub fn validate_config(config: &ProvisioningConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    let mut seen_types = HashSet::new();
    for (i, ctx) in config.contexts.iter().enumerate() {
        let name = ctx.service_type.as_str();
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceType(i));
        } else if !seen_types.insert(name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateServiceType(name.to_string()));
        }
        if ctx.log_tag.trim().is_empty() {
            errors.push(ValidationError::EmptyLogTag(name.to_string()));
        }
    }

    let mut seen_ids = HashSet::new();
    for c in &config.candidates {
        if !seen_ids.insert(c.id) {
            errors.push(ValidationError::DuplicateCandidateId(c.id));
        }
        if c.apn.trim().is_empty() {
            errors.push(ValidationError::EmptyApn(c.id));
        }
        if c.service_types.is_empty() {
            errors.push(ValidationError::NoServiceTypes(c.id));
        }
        if c.port == Some(0) {
            errors.push(ValidationError::InvalidPort(c.id));
        }
    }

    for ctx in &config.contexts {
        if !ctx.service_type.as_str().is_empty() && config.candidates_for(&ctx.service_type).is_empty() {
            tracing::warn!(service_type = %ctx.service_type, "No candidate can handle service type");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
