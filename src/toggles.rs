//! Feature toggles.
//!
//! Every toggle is a stored boolean-like option plus a plain function that
//! unhooks (or hooks) host callbacks when the option is truthy. The table is
//! walked once per request after plugins are loaded.

use crate::config::OptionKeys;
use crate::core::{Result, field_is_truthy, is_truthy};
use crate::host::RequestContext;
use crate::storage::SettingsStore;
use log::debug;

/// Default callback priority of the host's hook system.
pub const DEFAULT_PRIORITY: i32 = 10;

/// The host's action/filter registry.
pub trait HookRegistry {
    fn remove_action(&mut self, hook: &str, callback: &str, priority: i32);
    fn remove_filter(&mut self, hook: &str, callback: &str, priority: i32);
    fn add_filter(&mut self, hook: &str, callback: &str, priority: i32);
}

/// A single registry call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookChange {
    RemoveAction { hook: String, callback: String, priority: i32 },
    RemoveFilter { hook: String, callback: String, priority: i32 },
    AddFilter { hook: String, callback: String, priority: i32 },
}

/// Registry that records the calls it receives.
#[derive(Debug, Default)]
pub struct RecordingHookRegistry {
    changes: Vec<HookChange>,
}

impl RecordingHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[HookChange] {
        &self.changes
    }

    /// Whether `callback` was removed from action `hook`
    pub fn removed_action(&self, hook: &str, callback: &str) -> bool {
        self.changes.iter().any(|change| {
            matches!(change, HookChange::RemoveAction { hook: h, callback: c, .. } if h == hook && c == callback)
        })
    }

    /// Whether `callback` was added to filter `hook`
    pub fn added_filter(&self, hook: &str, callback: &str) -> bool {
        self.changes.iter().any(|change| {
            matches!(change, HookChange::AddFilter { hook: h, callback: c, .. } if h == hook && c == callback)
        })
    }
}

impl HookRegistry for RecordingHookRegistry {
    fn remove_action(&mut self, hook: &str, callback: &str, priority: i32) {
        self.changes.push(HookChange::RemoveAction {
            hook: hook.to_string(),
            callback: callback.to_string(),
            priority,
        });
    }

    fn remove_filter(&mut self, hook: &str, callback: &str, priority: i32) {
        self.changes.push(HookChange::RemoveFilter {
            hook: hook.to_string(),
            callback: callback.to_string(),
            priority,
        });
    }

    fn add_filter(&mut self, hook: &str, callback: &str, priority: i32) {
        self.changes.push(HookChange::AddFilter {
            hook: hook.to_string(),
            callback: callback.to_string(),
            priority,
        });
    }
}

/// One user-facing switch.
#[derive(Debug, Clone, Copy)]
pub struct FeatureToggle {
    /// Option name without prefix
    pub key: &'static str,
    pub label: &'static str,
    pub apply: fn(&mut dyn HookRegistry),
}

pub static FEATURE_TOGGLES: &[FeatureToggle] = &[
    FeatureToggle {
        key: "xmlrpc_disabled",
        label: "Disable XML-RPC",
        apply: disable_xmlrpc,
    },
    FeatureToggle {
        key: "emoji_disabled",
        label: "Remove emoji scripts and styles",
        apply: disable_emoji,
    },
    FeatureToggle {
        key: "rest_api_links_disabled",
        label: "Remove REST API discovery links",
        apply: disable_rest_api_links,
    },
    FeatureToggle {
        key: "generator_disabled",
        label: "Remove generator meta tag",
        apply: disable_generator,
    },
    FeatureToggle {
        key: "wlwmanifest_disabled",
        label: "Remove Windows Live Writer manifest link",
        apply: disable_wlwmanifest,
    },
    FeatureToggle {
        key: "shortlink_disabled",
        label: "Remove shortlink tag and header",
        apply: disable_shortlink,
    },
    FeatureToggle {
        key: "oembed_discovery_disabled",
        label: "Remove oEmbed discovery links",
        apply: disable_oembed_discovery,
    },
    FeatureToggle {
        key: "login_replace_wp_logo_link",
        label: "Point the login logo at the site home page",
        apply: replace_login_logo_link,
    },
];

fn disable_xmlrpc(registry: &mut dyn HookRegistry) {
    registry.add_filter("xmlrpc_enabled", "__return_false", DEFAULT_PRIORITY);
    registry.remove_action("wp_head", "rsd_link", DEFAULT_PRIORITY);
}

fn disable_emoji(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "print_emoji_detection_script", 7);
    registry.remove_action("admin_print_scripts", "print_emoji_detection_script", DEFAULT_PRIORITY);
    registry.remove_action("wp_print_styles", "print_emoji_styles", DEFAULT_PRIORITY);
    registry.remove_action("admin_print_styles", "print_emoji_styles", DEFAULT_PRIORITY);
    registry.remove_filter("the_content_feed", "wp_staticize_emoji", DEFAULT_PRIORITY);
    registry.remove_filter("comment_text_rss", "wp_staticize_emoji", DEFAULT_PRIORITY);
    registry.remove_filter("wp_mail", "wp_staticize_emoji_for_email", DEFAULT_PRIORITY);
}

fn disable_rest_api_links(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "rest_output_link_wp_head", DEFAULT_PRIORITY);
    registry.remove_action("template_redirect", "rest_output_link_header", 11);
    registry.remove_action("xmlrpc_rsd_apis", "rest_output_rsd", DEFAULT_PRIORITY);
}

fn disable_generator(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "wp_generator", DEFAULT_PRIORITY);
}

fn disable_wlwmanifest(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "wlwmanifest_link", DEFAULT_PRIORITY);
}

fn disable_shortlink(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "wp_shortlink_wp_head", DEFAULT_PRIORITY);
    registry.remove_action("template_redirect", "wp_shortlink_header", 11);
}

fn disable_oembed_discovery(registry: &mut dyn HookRegistry) {
    registry.remove_action("wp_head", "wp_oembed_add_discovery_links", DEFAULT_PRIORITY);
}

fn replace_login_logo_link(registry: &mut dyn HookRegistry) {
    registry.add_filter("login_headerurl", "home_url", DEFAULT_PRIORITY);
}

/// Look up a toggle by unprefixed key
pub fn find_toggle(key: &str) -> Option<&'static FeatureToggle> {
    FEATURE_TOGGLES.iter().find(|toggle| toggle.key == key)
}

/// Apply every toggle whose option is truthy, returning the applied keys in table order.
pub fn apply_enabled_toggles(
    store: &dyn SettingsStore,
    keys: &OptionKeys,
    registry: &mut dyn HookRegistry,
) -> Result<Vec<&'static str>> {
    let mut applied = Vec::new();
    for toggle in FEATURE_TOGGLES {
        let enabled = store
            .get(&keys.option(toggle.key))?
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        if enabled {
            (toggle.apply)(registry);
            applied.push(toggle.key);
        }
    }
    debug!("Applied {} feature toggles: {:?}", applied.len(), applied);
    Ok(applied)
}

/// Whether an incoming XML-RPC request must be refused outright.
///
/// Requires XML-RPC to be disabled and the `kill_requests` sub-option set.
pub fn should_reject_xmlrpc(
    store: &dyn SettingsStore,
    keys: &OptionKeys,
    ctx: &RequestContext,
) -> Result<bool> {
    if !ctx.is_xmlrpc {
        return Ok(false);
    }
    let disabled = store
        .get(&keys.option("xmlrpc_disabled"))?
        .map(|value| is_truthy(&value))
        .unwrap_or(false);
    if !disabled {
        return Ok(false);
    }
    Ok(store
        .get(&keys.option("xmlrpc_disabled_options"))?
        .map(|options| field_is_truthy(&options, "kill_requests"))
        .unwrap_or(false))
}
