use super::MigrationPlan;
use crate::config::{OptionKeys, PluginConfig};
use crate::core::{OptionValue, PluginVersion, Result, is_older};
use crate::host::{Host, RequestContext};
use crate::notices::{NoticeQueue, NoticeStatus, escape_attr};
use crate::storage::SettingsStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{Level, event, info_span};

/// Welcome notice queued on first activation. `{settings_url}` is replaced by the escaped link.
pub const WELCOME_NOTICE_TEMPLATE: &str = "<p>Thank you for installing <strong>No Nonsense</strong>. \
To get started, please visit the <a href=\"{settings_url}\"><strong>Settings</strong></a> page.</p>";

/// Outcome of one update pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version recorded before the pass, `None` on a fresh store
    pub previous_version: Option<PluginVersion>,
    pub current_version: PluginVersion,
    /// Names of the rules that ran, in execution order
    pub applied_rules: Vec<String>,
}

/// Keeps the stored settings in step with the running plugin version.
pub struct Migrator {
    store: Arc<dyn SettingsStore>,
    keys: OptionKeys,
    plan: MigrationPlan,
    notices: NoticeQueue,
    settings_url: String,
}

impl Migrator {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        keys: OptionKeys,
        plan: MigrationPlan,
        notices: NoticeQueue,
        settings_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            keys,
            plan,
            notices,
            settings_url: settings_url.into(),
        }
    }

    /// Migrator with the standard plan for the configured running version.
    pub fn from_config(config: &PluginConfig, store: Arc<dyn SettingsStore>) -> Result<Self> {
        config.validate()?;
        let keys = config.keys();
        let plan = MigrationPlan::standard(config.version()?, &keys)?;
        let notices = NoticeQueue::from_config(config, store.clone());
        Ok(Self::new(store, keys, plan, notices, config.settings_url.clone()))
    }

    pub fn running_version(&self) -> &PluginVersion {
        self.plan.running_version()
    }

    pub fn plan(&self) -> &MigrationPlan {
        &self.plan
    }

    /// Version recorded in the store.
    ///
    /// Missing, empty, non-string and unparseable records all read as `None`,
    /// which sorts before every version.
    pub fn stored_version(&self) -> Result<Option<PluginVersion>> {
        let key = self.keys.version();
        Ok(match self.store.get(&key)? {
            Some(Value::String(raw)) if !raw.trim().is_empty() => match PluginVersion::parse(&raw) {
                Ok(version) => Some(version),
                Err(err) => {
                    event!(Level::WARN, key = %key, error = %err, "ignoring unreadable stored version");
                    None
                }
            },
            _ => None,
        })
    }

    /// Whether an update pass is due for this request.
    pub fn needs_migration(&self, ctx: &RequestContext) -> Result<bool> {
        if !ctx.is_admin {
            return Ok(false);
        }
        let stored = self.stored_version()?;
        Ok(is_older(stored.as_ref(), self.running_version()))
    }

    /// Whether the store was written by a newer plugin than the running one.
    ///
    /// A forced update pass would then move the recorded version backwards.
    pub fn stored_is_newer(&self) -> Result<bool> {
        Ok(self
            .stored_version()?
            .is_some_and(|stored| stored > *self.running_version()))
    }

    /// Runs an update pass when the request is administrative and the stored version is older.
    pub fn maybe_migrate(&self, ctx: &RequestContext) -> Result<Option<MigrationReport>> {
        if !self.needs_migration(ctx)? {
            return Ok(None);
        }
        self.run_migration().map(Some)
    }

    /// Records the running version and applies every rule crossed since the stored version.
    ///
    /// Safe to call repeatedly and concurrently: rules are idempotent, so a
    /// racing pass converges to the same settings.
    pub fn run_migration(&self) -> Result<MigrationReport> {
        let span = info_span!(
            "migrator.update",
            running_version = %self.running_version()
        );
        let _enter = span.enter();

        let previous_version = self.stored_version()?;
        self.snapshot_previous_version()?;
        self.record_running_version()?;

        let applied_rules = self.plan.apply(self.store.as_ref(), previous_version.as_ref())?;

        event!(
            Level::INFO,
            previous = ?previous_version.as_ref().map(PluginVersion::as_str),
            applied = applied_rules.len(),
            "settings migrated"
        );

        Ok(MigrationReport {
            previous_version,
            current_version: self.running_version().clone(),
            applied_rules,
        })
    }

    /// First-activation setup. Never applies migration rules.
    pub fn install(&self, host: &dyn Host) -> Result<()> {
        let span = info_span!(
            "migrator.install",
            running_version = %self.running_version()
        );
        let _enter = span.enter();

        host.flush_rewrite_rules();
        self.snapshot_previous_version()?;
        self.record_running_version()?;
        self.notices.enqueue(self.welcome_message(), NoticeStatus::Info)?;

        event!(Level::INFO, "plugin installed");
        Ok(())
    }

    /// Markup of the welcome notice.
    pub fn welcome_message(&self) -> String {
        WELCOME_NOTICE_TEMPLATE.replace("{settings_url}", &escape_attr(&self.settings_url))
    }

    fn snapshot_previous_version(&self) -> Result<()> {
        let current = self
            .store
            .get(&self.keys.version())?
            .unwrap_or(OptionValue::Null);
        self.store.set(&self.keys.previous_version(), current)
    }

    fn record_running_version(&self) -> Result<()> {
        self.store.set(
            &self.keys.version(),
            Value::String(self.running_version().as_str().to_string()),
        )
    }
}
