//! What the plugin needs from the CMS it runs inside.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Facts about the current request, supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request targets the administrative area
    pub is_admin: bool,
    /// Request is an XML-RPC call
    pub is_xmlrpc: bool,
}

impl RequestContext {
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            is_xmlrpc: false,
        }
    }

    pub fn public() -> Self {
        Self::default()
    }

    pub fn xmlrpc() -> Self {
        Self {
            is_admin: false,
            is_xmlrpc: true,
        }
    }
}

/// Side effects the plugin asks of the host.
pub trait Host: Send + Sync {
    /// Drop cached routing state so it is rebuilt on the next request
    fn flush_rewrite_rules(&self);
}

/// Host that only counts requested effects.
#[derive(Debug, Default)]
pub struct CountingHost {
    rewrite_flushes: AtomicUsize,
}

impl CountingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rewrite_flushes(&self) -> usize {
        self.rewrite_flushes.load(Ordering::SeqCst)
    }
}

impl Host for CountingHost {
    fn flush_rewrite_rules(&self) {
        self.rewrite_flushes.fetch_add(1, Ordering::SeqCst);
    }
}
