//! Context registry.
//!
//! # Responsibilities
//! - Own one `ConnectionContext` per service type
//! - Guard each context with its own mutex
//! - Seed candidate queues from the provisioning config
//! - Apply reloaded configs without disturbing live attempts

use std::sync::{Arc, Mutex};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use crate::config::schema::{ContextConfig, ProvisioningConfig};
use crate::context::{ConnectionContext, ContextSnapshot, ServiceType};
use crate::error::{ContextError, Result};

pub type SharedContext = Arc<Mutex<ConnectionContext>>;

/// What a reload changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub added: Vec<ServiceType>,
    pub retired: Vec<ServiceType>,
    /// Quiescent contexts whose candidate queue was replaced.
    pub reseeded: Vec<ServiceType>,
}

/// Map of service type → context, each behind its own lock.
pub struct ContextRegistry {
    contexts: DashMap<ServiceType, SharedContext>,
    config: ArcSwap<ProvisioningConfig>,
}

impl ContextRegistry {
    /// Create an empty registry. Call `provision` to build contexts.
    pub fn new(config: ProvisioningConfig) -> Self {
        Self {
            contexts: DashMap::new(),
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Currently active provisioning config.
    pub fn config(&self) -> Arc<ProvisioningConfig> {
        self.config.load_full()
    }

    /// Create a context for every configured service type that has none.
    /// Returns the newly created types.
    pub fn provision(&self) -> Vec<ServiceType> {
        let config = self.config.load_full();
        let mut added = Vec::new();

        for entry in &config.contexts {
            if self.contexts.contains_key(&entry.service_type) {
                continue;
            }
            let ctx = build_context(&config, entry);
            self.contexts.insert(entry.service_type.clone(), Arc::new(Mutex::new(ctx)));
            tracing::info!(
                service_type = %entry.service_type,
                log_tag = %entry.log_tag,
                "Context provisioned"
            );
            added.push(entry.service_type.clone());
        }
        added
    }

    /// Register a context built by the caller, replacing any existing one.
    pub fn register(&self, ctx: ConnectionContext) -> SharedContext {
        let service_type = ctx.service_type().clone();
        let shared = Arc::new(Mutex::new(ctx));
        self.contexts.insert(service_type, shared.clone());
        shared
    }

    pub fn get(&self, service_type: &ServiceType) -> Result<SharedContext> {
        self.contexts
            .get(service_type)
            .map(|r| r.value().clone())
            .ok_or_else(|| ContextError::UnknownServiceType(service_type.clone()))
    }

    /// Run `f` with exclusive access to the context for `service_type`.
    pub fn with_context<R>(
        &self,
        service_type: &ServiceType,
        f: impl FnOnce(&mut ConnectionContext) -> R,
    ) -> Result<R> {
        let shared = self.get(service_type)?;
        let mut guard = shared
            .lock()
            .map_err(|_| ContextError::Poisoned(service_type.clone()))?;
        Ok(f(&mut guard))
    }

    /// Drop the context for `service_type`. Returns whether one existed.
    pub fn retire(&self, service_type: &ServiceType) -> bool {
        let existed = self.contexts.remove(service_type).is_some();
        if existed {
            tracing::info!(service_type = %service_type, "Context retired");
        }
        existed
    }

    /// Swap in `new_config`: add newly listed types, retire unlisted ones,
    /// apply the contract policy to every surviving context, and replace
    /// candidates on contexts that are Idle or Failed.
    ///
    /// Log tags and the `enabled`/`dependency_met` flags of existing
    /// contexts are left as they are; the file only seeds them at creation.
    pub fn reload(&self, new_config: ProvisioningConfig) -> Result<ReloadSummary> {
        self.config.store(Arc::new(new_config));
        let config = self.config.load_full();
        let mut summary = ReloadSummary::default();

        let stale: Vec<ServiceType> = self
            .contexts
            .iter()
            .map(|r| r.key().clone())
            .filter(|st| config.context(st).is_none())
            .collect();
        for st in stale {
            if self.retire(&st) {
                summary.retired.push(st);
            }
        }

        let mut existing = self.service_types();
        summary.added = self.provision();
        existing.retain(|st| !summary.added.contains(st));

        for st in existing {
            let reseeded = self.with_context(&st, |ctx| {
                ctx.set_policy(config.contracts.policy);
                if !ctx.state().is_quiescent() {
                    tracing::debug!(
                        service_type = %st,
                        state = %ctx.state(),
                        "Context busy, keeping current candidates"
                    );
                    return false;
                }
                ctx.set_candidates(config.candidates_for(&st));
                true
            })?;
            if reseeded {
                summary.reseeded.push(st);
            }
        }

        tracing::info!(
            added = summary.added.len(),
            retired = summary.retired.len(),
            reseeded = summary.reseeded.len(),
            "Provisioning reloaded"
        );
        Ok(summary)
    }

    /// Provisioned service types, sorted.
    pub fn service_types(&self) -> Vec<ServiceType> {
        let mut types: Vec<ServiceType> = self.contexts.iter().map(|r| r.key().clone()).collect();
        types.sort();
        types
    }

    /// Snapshots of every context, sorted by service type.
    pub fn snapshots(&self) -> Result<Vec<ContextSnapshot>> {
        self.service_types()
            .iter()
            .filter_map(|st| match self.with_context(st, |ctx| ctx.snapshot()) {
                // Retired between listing and locking.
                Err(ContextError::UnknownServiceType(_)) => None,
                other => Some(other),
            })
            .collect()
    }

    /// Service types whose context is ready, sorted.
    pub fn ready_service_types(&self) -> Result<Vec<ServiceType>> {
        let mut ready = Vec::new();
        for st in self.service_types() {
            match self.with_context(&st, |ctx| ctx.is_ready()) {
                Ok(true) => ready.push(st),
                Ok(false) | Err(ContextError::UnknownServiceType(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(ready)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

fn build_context(config: &ProvisioningConfig, entry: &ContextConfig) -> ConnectionContext {
    let mut ctx = ConnectionContext::new(entry.service_type.clone(), entry.log_tag.clone())
        .with_policy(config.contracts.policy);
    ctx.set_enabled(entry.enabled);
    ctx.set_dependency_met(entry.dependency_met);
    ctx.set_candidates(config.candidates_for(&entry.service_type));
    ctx
}
