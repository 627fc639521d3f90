use crate::core::{OptionValue, Result};

/// Settings store trait - the host's persistent key-value configuration.
///
/// Every operation is a single read or write. The store gives no isolation
/// across several calls, so callers that read-modify-write must tolerate
/// concurrent writers.
pub trait SettingsStore: Send + Sync {
    /// Read an option, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<OptionValue>>;

    /// Create or overwrite an option
    fn set(&self, key: &str, value: OptionValue) -> Result<()>;

    /// Remove an option, returns whether it existed
    fn delete(&self, key: &str) -> Result<bool>;

    /// List stored keys in ascending order
    fn keys(&self) -> Result<Vec<String>>;

    /// Check if an option exists
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
