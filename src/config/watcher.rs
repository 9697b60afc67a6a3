//! Provisioning hot reload.
//!
//! # Data Flow
//! ```text
//! file event (notify)
//!     → forward_change: reload + validate, send over mpsc
//!     → apply_updates: ContextRegistry::reload, log ReloadSummary
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::ProvisioningConfig;
use crate::registry::ContextRegistry;

/// Monitors the provisioning file and forwards every valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ProvisioningConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated revisions.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ProvisioningConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (Self { path: path.to_path_buf(), update_tx }, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                forward_change(&watched, &update_tx, res);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Provisioning watcher started");
        Ok(watcher)
    }
}

/// Reload `path` after a modify/create event and send it on.
/// Returns true when a revision was delivered.
fn forward_change(
    path: &Path,
    tx: &mpsc::UnboundedSender<ProvisioningConfig>,
    res: notify::Result<Event>,
) -> bool {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Watch error");
            return false;
        }
    };
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }

    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = ?path, "Rejected provisioning revision, keeping current: {}", e);
            return false;
        }
    };

    tracing::debug!(
        path = ?path,
        contexts = config.contexts.len(),
        candidates = config.candidates.len(),
        "Provisioning revision loaded"
    );
    if tx.send(config).is_err() {
        tracing::warn!(path = ?path, "Provisioning consumer gone, revision dropped");
        return false;
    }
    true
}

/// Apply every received revision to `registry` until the sender closes.
/// Returns the number of revisions applied.
pub async fn apply_updates(
    registry: &ContextRegistry,
    mut updates: mpsc::UnboundedReceiver<ProvisioningConfig>,
) -> usize {
    let mut applied = 0;
    while let Some(config) = updates.recv().await {
        match registry.reload(config) {
            Ok(summary) => {
                applied += 1;
                tracing::info!(
                    added = ?summary.added,
                    retired = ?summary.retired,
                    reseeded = ?summary.reseeded,
                    "Provisioning applied"
                );
            }
            Err(e) => tracing::error!(error = %e, "Failed to apply provisioning"),
        }
    }
    applied
}
