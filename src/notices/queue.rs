use super::sanitize::{escape_attr, sanitize_html};
use crate::config::PluginConfig;
use crate::core::{OptionValue, Result, SettingsError};
use crate::storage::SettingsStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{Level, event};

/// Severity of a notice, rendered as the `notice-{status}` CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStatus {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeStatus::Info => "info",
            NoticeStatus::Success => "success",
            NoticeStatus::Warning => "warning",
            NoticeStatus::Error => "error",
        }
    }
}

impl fmt::Display for NoticeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message shown once on the next admin page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredNotice {
    /// Markup, sanitized when rendered
    pub content: String,
    pub status: NoticeStatus,
}

impl DeferredNotice {
    pub fn new(content: impl Into<String>, status: NoticeStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }
}

/// Render-once notice queue stored under a single option key.
///
/// Delivery is at most once: the stored sequence is deleted after every
/// render pass, whatever happened while rendering.
#[derive(Clone)]
pub struct NoticeQueue {
    store: Arc<dyn SettingsStore>,
    key: String,
    notice_class: String,
}

impl NoticeQueue {
    pub fn new(store: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            notice_class: crate::config::DEFAULT_NOTICE_CLASS.to_string(),
        }
    }

    pub fn from_config(config: &PluginConfig, store: Arc<dyn SettingsStore>) -> Self {
        Self::new(store, config.keys().deferred_admin_notices()).with_notice_class(&config.notice_class)
    }

    /// Set the extra CSS class on rendered notices
    pub fn with_notice_class(mut self, class: &str) -> Self {
        self.notice_class = class.to_string();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append a notice. No deduplication and no size bound.
    pub fn enqueue(&self, content: impl Into<String>, status: NoticeStatus) -> Result<()> {
        let mut entries = match self.store.get(&self.key)? {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                event!(Level::WARN, key = %self.key, "replacing malformed notice queue");
                Vec::new()
            }
        };
        entries.push(serde_json::to_value(DeferredNotice::new(content, status))?);
        self.store.set(&self.key, Value::Array(entries))
    }

    /// Queued notices, without clearing them. Malformed entries are skipped.
    pub fn pending(&self) -> Result<Vec<DeferredNotice>> {
        Ok(decode_entries(&self.key, self.store.get(&self.key)?))
    }

    /// Render every queued notice into `out`, then clear the queue.
    ///
    /// The queue is cleared even when reading or rendering fails; the first
    /// such failure is returned after the clear. Returns the number of
    /// notices written.
    pub fn drain_and_render<W: Write + ?Sized>(&self, out: &mut W) -> Result<usize> {
        let rendered = self.render_pending(out);
        let cleared = self.store.delete(&self.key);

        let count = rendered?;
        cleared?;
        if count > 0 {
            event!(Level::DEBUG, key = %self.key, count, "deferred notices rendered");
        }
        Ok(count)
    }

    /// Drain into a string
    pub fn drain_to_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.drain_and_render(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SettingsError::Serialization(e.to_string()))
    }

    /// Markup of one notice
    pub fn render(&self, notice: &DeferredNotice) -> String {
        format!(
            "<div class=\"notice notice-{} is-dismissible {}\">{}</div>",
            escape_attr(notice.status.as_str()),
            escape_attr(&self.notice_class),
            sanitize_html(&notice.content)
        )
    }

    fn render_pending<W: Write + ?Sized>(&self, out: &mut W) -> Result<usize> {
        let notices = self.pending()?;
        for notice in &notices {
            out.write_all(self.render(notice).as_bytes())?;
        }
        Ok(notices.len())
    }
}

fn decode_entries(key: &str, stored: Option<OptionValue>) -> Vec<DeferredNotice> {
    let entries = match stored {
        Some(Value::Array(entries)) => entries,
        Some(Value::Null) | None => return Vec::new(),
        Some(_) => {
            event!(Level::WARN, key = %key, "notice queue is not a list, ignoring it");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<DeferredNotice>(entry) {
            Ok(notice) => Some(notice),
            Err(err) => {
                event!(Level::WARN, key = %key, error = %err, "skipping malformed notice");
                None
            }
        })
        .collect()
}
