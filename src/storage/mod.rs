pub mod engine;
pub mod memory;
pub mod persistence;

pub use engine::SettingsStore;
pub use memory::MemorySettingsStore;
pub use persistence::{FileSettingsStore, StoreFormat};
