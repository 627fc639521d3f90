//! Whole request lifecycles against a settings file, reopened per request

use no_nonsense::toggles::RecordingHookRegistry;
use no_nonsense::{
    CountingHost, FileSettingsStore, NoNonsense, PluginConfig, RequestContext, RequestOutcome,
    SettingsStore, StoreFormat,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn boot(path: &Path, running: &str) -> (Arc<FileSettingsStore>, Arc<CountingHost>, NoNonsense) {
    let store = Arc::new(FileSettingsStore::open(path).unwrap());
    let host = Arc::new(CountingHost::new());
    let config = PluginConfig::new().running_version(running);
    let plugin = NoNonsense::new(config, store.clone(), host.clone()).unwrap();
    (store, host, plugin)
}

#[test]
fn test_activation_then_first_admin_page() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("options.json");

    {
        let (_store, host, plugin) = boot(&path, "3.6.3");
        plugin.on_activation().unwrap();
        assert_eq!(host.rewrite_flushes(), 1);
    }

    let (store, _host, plugin) = boot(&path, "3.6.3");
    let state = plugin
        .on_plugins_loaded(&RequestContext::admin(), &mut RecordingHookRegistry::new())
        .unwrap();
    assert!(state.migration.is_none());

    let mut page = Vec::<u8>::new();
    assert_eq!(plugin.on_admin_notices(&mut page).unwrap(), 1);
    let html = String::from_utf8(page).unwrap();
    assert!(html.contains("notice-info"));
    assert!(html.contains("options-general.php?page=no-nonsense"));
    assert!(!store.contains("r34nono_deferred_admin_notices").unwrap());

    // the clear is on disk, not only in memory
    let (_store, _host, plugin) = boot(&path, "3.6.3");
    assert_eq!(plugin.on_admin_notices(&mut Vec::<u8>::new()).unwrap(), 0);
}

#[test]
fn test_upgrade_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("options.json");

    {
        let store = FileSettingsStore::open(&path).unwrap();
        store.set("r34nono_version", json!("1.3.2")).unwrap();
        store.set("r34nono_xmlrpc_enabled", json!(true)).unwrap();
        store
            .set("r34nono_xmlrpc_disabled_options", json!({"kill_requests": true}))
            .unwrap();
    }

    let (_store, _host, plugin) = boot(&path, "3.6.3");
    // public traffic never migrates
    let state = plugin
        .on_plugins_loaded(&RequestContext::public(), &mut RecordingHookRegistry::new())
        .unwrap();
    assert!(state.migration.is_none());
    assert_eq!(
        plugin.on_request_start(&RequestContext::xmlrpc()).unwrap(),
        RequestOutcome::Continue
    );

    let mut registry = RecordingHookRegistry::new();
    let state = plugin
        .on_plugins_loaded(&RequestContext::admin(), &mut registry)
        .unwrap();
    let report = state.migration.expect("admin request should migrate");
    assert_eq!(report.previous_version.unwrap().as_str(), "1.3.2");
    assert_eq!(state.applied_toggles, vec!["xmlrpc_disabled"]);
    assert!(registry.added_filter("xmlrpc_enabled", "__return_false"));

    let (store, _host, plugin) = boot(&path, "3.6.3");
    assert_eq!(store.get("r34nono_version").unwrap(), Some(json!("3.6.3")));
    assert_eq!(store.get("r34nono_previous_version").unwrap(), Some(json!("1.3.2")));
    assert!(!store.contains("r34nono_xmlrpc_enabled").unwrap());
    assert_eq!(
        plugin.on_request_start(&RequestContext::xmlrpc()).unwrap(),
        RequestOutcome::Reject(403)
    );
    // no notices come out of an update pass
    assert_eq!(plugin.on_admin_notices(&mut Vec::<u8>::new()).unwrap(), 0);
}

#[test]
fn test_messagepack_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("options.msgpack");

    {
        let (store, _host, plugin) = boot(&path, "3.6.3");
        assert_eq!(store.format(), StoreFormat::MessagePack);
        plugin.on_activation().unwrap();
    }

    let (store, _host, plugin) = boot(&path, "3.6.3");
    assert_eq!(store.get("r34nono_version").unwrap(), Some(json!("3.6.3")));
    assert_eq!(plugin.notices().pending().unwrap().len(), 1);
}

#[test]
fn test_downgrade_leaves_settings_alone() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("options.json");
    {
        let store = FileSettingsStore::open(&path).unwrap();
        store.set("r34nono_version", json!("3.6.3")).unwrap();
    }

    let (store, _host, plugin) = boot(&path, "3.5.0");
    assert!(!plugin.migrator().needs_migration(&RequestContext::admin()).unwrap());
    plugin
        .on_plugins_loaded(&RequestContext::admin(), &mut RecordingHookRegistry::new())
        .unwrap();
    assert_eq!(store.get("r34nono_version").unwrap(), Some(json!("3.6.3")));
    assert!(store.get("r34nono_previous_version").unwrap().is_none());
}

#[test]
fn test_failed_update_pass_keeps_gate_open() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("site");
    let path = dir.join("options.json");
    {
        let store = FileSettingsStore::open(&path).unwrap();
        store.set("r34nono_version", json!("1.3.9")).unwrap();
        store.set("r34nono_xmlrpc_enabled", json!(true)).unwrap();
    }

    let (store, _host, plugin) = boot(&path, "3.6.3");
    std::fs::remove_dir_all(&dir).unwrap();
    std::fs::write(&dir, b"").unwrap();

    assert!(plugin
        .on_plugins_loaded(&RequestContext::admin(), &mut RecordingHookRegistry::new())
        .is_err());
    assert_eq!(store.get("r34nono_version").unwrap(), Some(json!("1.3.9")));
    assert!(plugin.migrator().needs_migration(&RequestContext::admin()).unwrap());
}
