//! Versioned settings migrations.
//!
//! A [`MigrationPlan`] is the ladder of rules known to the running plugin.
//! Each [`MigrationRule`] carries the version that introduced it; when the
//! stored version is older than that threshold the rule runs once during the
//! next update pass driven by [`Migrator`].

use crate::core::{PluginVersion, Result, SettingsError};
use crate::storage::SettingsStore;
use std::collections::HashSet;
use std::sync::Arc;

pub mod migrator;

pub use migrator::{MigrationReport, Migrator, WELCOME_NOTICE_TEMPLATE};

/// A transform applied to the settings store when a rule fires.
///
/// Transforms must be idempotent: a second run over an already migrated
/// store leaves it unchanged.
pub type RuleTransformFn = Arc<dyn Fn(&dyn SettingsStore) -> Result<()> + Send + Sync>;

/// A single rung of the migration ladder.
#[derive(Clone)]
pub struct MigrationRule {
    pub threshold: PluginVersion,
    pub name: String,
    pub(crate) transform: RuleTransformFn,
}

/// Ordered set of migration rules for one running version.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub(crate) running_version: PluginVersion,
    pub(crate) rules: Vec<MigrationRule>,
}

// Rule construction, plan validation and plan execution live in separate files.
include!("rule_builder.rs");
include!("plan_validation.rs");
include!("plan_execution.rs");
