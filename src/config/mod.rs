//! Provisioning configuration subsystem.
//!
//! # Data Flow
//! ```text
//! provisioning file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProvisioningConfig (validated, immutable)
//!     → ContextRegistry::provision
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → ContextRegistry::reload swaps config and re-seeds idle contexts
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All sections have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ContextConfig, ContractsConfig, ObservabilityConfig, ProvisioningConfig};
pub use validation::ValidationError;
