//! Everything a host integration usually needs in one import.

pub use crate::config::{OptionKeys, PluginConfig};
pub use crate::core::{PluginVersion, Result, SettingsError, is_truthy};
pub use crate::facade::{NoNonsense, RequestOutcome};
pub use crate::host::{Host, RequestContext};
pub use crate::migration::{MigrationPlan, MigrationRule, Migrator, rename_option};
pub use crate::notices::{NoticeQueue, NoticeStatus};
pub use crate::storage::{FileSettingsStore, MemorySettingsStore, SettingsStore};
pub use crate::toggles::{FEATURE_TOGGLES, HookRegistry};
