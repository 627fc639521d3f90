impl std::fmt::Debug for MigrationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRule")
            .field("threshold", &self.threshold.as_str())
            .field("name", &self.name)
            .finish()
    }
}

impl MigrationRule {
    /// Creates a rule introduced in `threshold`.
    pub fn new<F>(threshold: &str, name: impl Into<String>, transform: F) -> Result<Self>
    where
        F: Fn(&dyn SettingsStore) -> Result<()> + Send + Sync + 'static,
    {
        Ok(Self {
            threshold: PluginVersion::parse(threshold)?,
            name: name.into(),
            transform: Arc::new(transform),
        })
    }

    /// Rule that moves the value of `old_key` to `new_key`.
    ///
    /// See [`rename_option`] for the exact semantics.
    pub fn rename(threshold: &str, old_key: &str, new_key: &str) -> Result<Self> {
        let name = format!("rename {} -> {}", old_key, new_key);
        let old_key = old_key.to_string();
        let new_key = new_key.to_string();
        Self::new(threshold, name, move |store| {
            rename_option(store, &old_key, &new_key).map(|_| ())
        })
    }

    /// Runs the transform against `store`.
    pub fn apply(&self, store: &dyn SettingsStore) -> Result<()> {
        (self.transform)(store)
    }
}

/// Moves an option to a new key.
///
/// When `old_key` exists and `new_key` holds no meaningful override (absent
/// or falsy), the value is copied to `new_key` and `old_key` is deleted.
/// An absent `old_key` is the steady state after migration and leaves the
/// store untouched. Returns whether a move happened.
pub fn rename_option(store: &dyn SettingsStore, old_key: &str, new_key: &str) -> Result<bool> {
    let Some(value) = store.get(old_key)? else {
        return Ok(false);
    };

    let has_override = store
        .get(new_key)?
        .map(|current| crate::core::is_truthy(&current))
        .unwrap_or(false);
    if has_override {
        return Ok(false);
    }

    store.set(new_key, value)?;
    store.delete(old_key)?;
    Ok(true)
}
