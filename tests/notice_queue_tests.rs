use no_nonsense::{MemorySettingsStore, NoticeQueue, NoticeStatus, SettingsStore};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Arc;

const KEY: &str = "r34nono_deferred_admin_notices";

fn queue() -> (Arc<MemorySettingsStore>, NoticeQueue) {
    let store = Arc::new(MemorySettingsStore::new());
    let queue = NoticeQueue::new(store.clone(), KEY);
    (store, queue)
}

#[test]
fn test_render_order_matches_enqueue_order() {
    let (store, queue) = queue();
    queue.enqueue("<p>first</p>", NoticeStatus::Info).unwrap();
    queue.enqueue("<p>second</p>", NoticeStatus::Warning).unwrap();
    queue.enqueue("<p>third</p>", NoticeStatus::Success).unwrap();

    let html = queue.drain_to_string().unwrap();
    let first = html.find("first").unwrap();
    let second = html.find("second").unwrap();
    let third = html.find("third").unwrap();
    assert!(first < second && second < third);
    assert!(html.contains("notice-warning"));
    assert!(!store.contains(KEY).unwrap());
}

#[test]
fn test_each_notice_renders_once() {
    let (_store, queue) = queue();
    queue.enqueue("<p>once</p>", NoticeStatus::Info).unwrap();

    let mut page = Vec::<u8>::new();
    assert_eq!(queue.drain_and_render(&mut page).unwrap(), 1);
    let mut next_page = Vec::<u8>::new();
    assert_eq!(queue.drain_and_render(&mut next_page).unwrap(), 0);
    assert!(next_page.is_empty());
}

#[test]
fn test_duplicates_are_kept() {
    let (_store, queue) = queue();
    queue.enqueue("<p>same</p>", NoticeStatus::Info).unwrap();
    queue.enqueue("<p>same</p>", NoticeStatus::Info).unwrap();

    assert_eq!(queue.pending().unwrap().len(), 2);
    assert_eq!(queue.drain_to_string().unwrap().matches("same").count(), 2);
}

#[test]
fn test_rendered_markup_is_sanitized() {
    let (_store, queue) = queue();
    queue
        .enqueue(
            "<p onclick=\"steal()\">Hi <script>alert(1)</script><a href=\"javascript:x()\">link</a></p>",
            NoticeStatus::Error,
        )
        .unwrap();

    let html = queue.drain_to_string().unwrap();
    assert!(html.starts_with("<div class=\"notice notice-error is-dismissible r34nono-admin-notice\">"));
    assert!(!html.contains("onclick"));
    assert!(!html.contains("<script"));
    assert!(!html.contains("alert(1)"));
    assert!(!html.contains("javascript:"));
    assert!(html.contains("link</a>"));
}

#[test]
fn test_entries_stored_before_malformed_ones_still_render() {
    let (store, queue) = queue();
    store
        .set(
            KEY,
            json!([
                {"content": "<p>kept</p>", "status": "info"},
                {"content": 42},
                "nonsense",
                {"content": "<p>also kept</p>", "status": "success"}
            ]),
        )
        .unwrap();

    let html = queue.drain_to_string().unwrap();
    assert!(html.contains("kept"));
    assert!(html.contains("also kept"));
    assert!(!store.contains(KEY).unwrap());
}

struct BrokenPage;

impl Write for BrokenPage {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_failed_render_still_clears_queue() {
    let (store, queue) = queue();
    queue.enqueue("<p>lost</p>", NoticeStatus::Info).unwrap();

    assert!(queue.drain_and_render(&mut BrokenPage).is_err());
    assert!(!store.contains(KEY).unwrap());
    assert!(queue.pending().unwrap().is_empty());
}

#[test]
fn test_custom_notice_class() {
    let store = Arc::new(MemorySettingsStore::new());
    let queue = NoticeQueue::new(store, "acme_notices").with_notice_class("acme-notice");
    queue.enqueue("<p>hello</p>", NoticeStatus::Info).unwrap();

    let html = queue.drain_to_string().unwrap();
    assert_eq!(
        html,
        "<div class=\"notice notice-info is-dismissible acme-notice\"><p>hello</p></div>"
    );
}
