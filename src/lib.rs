// ============================================================================
// No Nonsense settings core
// ============================================================================

//! Settings lifecycle for the No Nonsense CMS plugin.
//!
//! The plugin stores its switches in the host's key-value settings store.
//! This crate keeps that store in step with the running plugin version and
//! delivers one-time admin notices:
//!
//! - [`Migrator`] records the running version and applies every
//!   [`MigrationRule`] crossed since the stored version,
//! - [`NoticeQueue`] holds sanitized notices until the next admin page view,
//! - [`toggles`] maps each stored switch to the host hooks it removes,
//! - [`NoNonsense`] wires all of it to the host's lifecycle callbacks.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use no_nonsense::{CountingHost, MemorySettingsStore, NoNonsense, PluginConfig, RequestContext};
//! use no_nonsense::toggles::RecordingHookRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemorySettingsStore::new());
//! let plugin = NoNonsense::new(PluginConfig::new(), store, Arc::new(CountingHost::new()))?;
//!
//! plugin.on_activation()?;
//! plugin.on_plugins_loaded(&RequestContext::admin(), &mut RecordingHookRegistry::new())?;
//!
//! let mut page = Vec::<u8>::new();
//! assert_eq!(plugin.on_admin_notices(&mut page)?, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod host;
pub mod migration;
pub mod notices;
pub mod prelude;
pub mod storage;
pub mod toggles;

// Re-export main types for convenience
pub use crate::config::{OptionKeys, PluginConfig};
pub use crate::core::{OptionValue, PluginVersion, Result, SettingsError};
pub use crate::facade::{LoadedState, NoNonsense, RequestOutcome};
pub use crate::host::{CountingHost, Host, RequestContext};
pub use crate::migration::{MigrationPlan, MigrationReport, MigrationRule, Migrator};
pub use crate::notices::{DeferredNotice, NoticeQueue, NoticeStatus};
pub use crate::storage::{FileSettingsStore, MemorySettingsStore, SettingsStore, StoreFormat};
