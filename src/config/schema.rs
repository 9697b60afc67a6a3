//! Configuration schema definitions.
//!
//! This module defines the provisioning file: which contexts exist, the
//! candidates available to them, and ambient settings.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use crate::context::{CandidateConfig, ContractPolicy, ServiceType};

/// Root provisioning configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Caller-contract handling.
    pub contracts: ContractsConfig,

    /// One entry per service type to provision.
    pub contexts: Vec<ContextConfig>,

    /// Candidate configurations, in trial order.
    pub candidates: Vec<CandidateConfig>,
}

impl ProvisioningConfig {
    /// Candidates able to carry `service_type`, in file order.
    pub fn candidates_for(&self, service_type: &ServiceType) -> Vec<CandidateConfig> {
        self.candidates
            .iter()
            .filter(|c| c.can_handle(service_type))
            .cloned()
            .collect()
    }

    /// Context entry for `service_type`, if configured.
    pub fn context(&self, service_type: &ServiceType) -> Option<&ContextConfig> {
        self.contexts.iter().find(|c| &c.service_type == service_type)
    }
}

/// A service type to provision a context for.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextConfig {
    /// Service type (e.g., "default", "mms").
    pub service_type: ServiceType,

    /// Tag attached to every log event of the context.
    #[serde(default = "default_log_tag")]
    pub log_tag: String,

    /// Initial user/app request flag.
    #[serde(default)]
    pub enabled: bool,

    /// Initial dependency flag.
    #[serde(default = "default_dependency_met")]
    pub dependency_met: bool,
}

impl ContextConfig {
    pub fn new(service_type: impl Into<ServiceType>) -> Self {
        Self {
            service_type: service_type.into(),
            log_tag: default_log_tag(),
            enabled: false,
            dependency_met: default_dependency_met(),
        }
    }
}

fn default_log_tag() -> String {
    "DCT".to_string()
}

fn default_dependency_met() -> bool {
    true
}

/// Caller-contract handling.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Policy applied to every provisioned context.
    /// Defaults to `assert` in debug builds and `warn` in release builds.
    pub policy: ContractPolicy,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
