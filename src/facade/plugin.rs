use crate::config::{OptionKeys, PluginConfig};
use crate::core::Result;
use crate::host::{Host, RequestContext};
use crate::migration::{MigrationReport, Migrator};
use crate::notices::NoticeQueue;
use crate::storage::SettingsStore;
use crate::toggles::{HookRegistry, apply_enabled_toggles, should_reject_xmlrpc};
use std::io::Write;
use std::sync::Arc;
use tracing::{Level, event};

/// HTTP status returned to refused XML-RPC requests.
pub const XMLRPC_REJECT_STATUS: u16 = 403;

/// What the host should do with the incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Continue,
    /// Stop immediately with this HTTP status
    Reject(u16),
}

/// Result of the "plugins loaded" callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedState {
    /// Present when an update pass ran
    pub migration: Option<MigrationReport>,
    /// Toggles applied to the hook registry
    pub applied_toggles: Vec<&'static str>,
}

/// The plugin as the host sees it: one callback per lifecycle trigger.
///
/// All components share one settings store handle.
pub struct NoNonsense {
    config: PluginConfig,
    keys: OptionKeys,
    store: Arc<dyn SettingsStore>,
    host: Arc<dyn Host>,
    migrator: Migrator,
    notices: NoticeQueue,
}

impl NoNonsense {
    pub fn new(config: PluginConfig, store: Arc<dyn SettingsStore>, host: Arc<dyn Host>) -> Result<Self> {
        let migrator = Migrator::from_config(&config, store.clone())?;
        let notices = NoticeQueue::from_config(&config, store.clone());
        Ok(Self {
            keys: config.keys(),
            config,
            store,
            host,
            migrator,
            notices,
        })
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Earliest check on every request: refuse XML-RPC when the kill switch is on.
    pub fn on_request_start(&self, ctx: &RequestContext) -> Result<RequestOutcome> {
        if should_reject_xmlrpc(self.store.as_ref(), &self.keys, ctx)? {
            event!(Level::INFO, status = XMLRPC_REJECT_STATUS, "rejecting XML-RPC request");
            return Ok(RequestOutcome::Reject(XMLRPC_REJECT_STATUS));
        }
        Ok(RequestOutcome::Continue)
    }

    /// "Plugins loaded": run the gated update pass, then apply feature toggles.
    pub fn on_plugins_loaded(
        &self,
        ctx: &RequestContext,
        registry: &mut dyn HookRegistry,
    ) -> Result<LoadedState> {
        let migration = self.migrator.maybe_migrate(ctx)?;
        let applied_toggles = apply_enabled_toggles(self.store.as_ref(), &self.keys, registry)?;
        Ok(LoadedState {
            migration,
            applied_toggles,
        })
    }

    /// Plugin activation.
    pub fn on_activation(&self) -> Result<()> {
        self.migrator.install(self.host.as_ref())
    }

    /// Admin notice render phase.
    pub fn on_admin_notices<W: Write + ?Sized>(&self, out: &mut W) -> Result<usize> {
        self.notices.drain_and_render(out)
    }
}
