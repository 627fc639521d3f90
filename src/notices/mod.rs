pub mod queue;
pub mod sanitize;

pub use queue::{DeferredNotice, NoticeQueue, NoticeStatus};
pub use sanitize::{escape_attr, sanitize_html};
