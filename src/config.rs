use crate::core::{PluginVersion, Result, SettingsError};
use crate::storage::StoreFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Option prefix used by the plugin.
pub const DEFAULT_OPTION_PREFIX: &str = "r34nono_";
/// Version of the plugin this crate ships as.
pub const RUNNING_VERSION: &str = "3.6.3";
pub const DEFAULT_SETTINGS_URL: &str = "/wp-admin/options-general.php?page=no-nonsense";
pub const DEFAULT_NOTICE_CLASS: &str = "r34nono-admin-notice";

/// Plugin configuration
///
/// Built with chained setters or loaded from a JSON file; every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Prefix prepended to every stored option key
    pub option_prefix: String,

    /// Version of the running plugin
    pub running_version: String,

    /// Link target of the welcome notice
    pub settings_url: String,

    /// Extra CSS class on rendered notices
    pub notice_class: String,

    /// Settings file used by the command line tool
    pub store_path: PathBuf,

    /// Encoding of the settings file, inferred from the extension when unset
    pub store_format: Option<StoreFormat>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginConfig {
    pub fn new() -> Self {
        Self {
            option_prefix: DEFAULT_OPTION_PREFIX.to_string(),
            running_version: RUNNING_VERSION.to_string(),
            settings_url: DEFAULT_SETTINGS_URL.to_string(),
            notice_class: DEFAULT_NOTICE_CLASS.to_string(),
            store_path: PathBuf::from("no-nonsense-settings.json"),
            store_format: None,
        }
    }

    /// Set the option prefix
    pub fn option_prefix(mut self, prefix: &str) -> Self {
        self.option_prefix = prefix.to_string();
        self
    }

    /// Set the running plugin version
    pub fn running_version(mut self, version: &str) -> Self {
        self.running_version = version.to_string();
        self
    }

    /// Set the settings page URL
    pub fn settings_url(mut self, url: &str) -> Self {
        self.settings_url = url.to_string();
        self
    }

    /// Set the notice CSS class
    pub fn notice_class(mut self, class: &str) -> Self {
        self.notice_class = class.to_string();
        self
    }

    /// Set the settings file location
    pub fn store_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = path.into();
        self
    }

    /// Force a settings file format
    pub fn store_format(mut self, format: StoreFormat) -> Self {
        self.store_format = Some(format);
        self
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            SettingsError::IoError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_slice(&data).map_err(|e| {
            SettingsError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed running version
    pub fn version(&self) -> Result<PluginVersion> {
        PluginVersion::parse(&self.running_version)
    }

    /// Format of the settings file
    pub fn resolved_store_format(&self) -> StoreFormat {
        self.store_format
            .unwrap_or_else(|| StoreFormat::from_path(&self.store_path))
    }

    /// Option key names derived from the prefix
    pub fn keys(&self) -> OptionKeys {
        OptionKeys::new(&self.option_prefix)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.option_prefix.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "option_prefix must not be empty".to_string(),
            ));
        }
        if self.option_prefix.chars().any(char::is_whitespace) {
            return Err(SettingsError::InvalidConfig(
                "option_prefix must not contain whitespace".to_string(),
            ));
        }
        self.version()
            .map_err(|e| SettingsError::InvalidConfig(format!("running_version: {}", e)))?;
        if self.settings_url.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "settings_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fully prefixed keys of the options the plugin owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionKeys {
    prefix: String,
}

impl OptionKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix an arbitrary option name
    pub fn option(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    pub fn version(&self) -> String {
        self.option("version")
    }

    pub fn previous_version(&self) -> String {
        self.option("previous_version")
    }

    pub fn deferred_admin_notices(&self) -> String {
        self.option("deferred_admin_notices")
    }
}

impl Default for OptionKeys {
    fn default() -> Self {
        Self::new(DEFAULT_OPTION_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PluginConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.version().unwrap().as_str(), RUNNING_VERSION);
        assert_eq!(config.resolved_store_format(), StoreFormat::Json);
    }

    #[test]
    fn test_builder_chain() {
        let config = PluginConfig::new()
            .option_prefix("acme_")
            .running_version("1.2.0")
            .settings_url("/admin/settings")
            .store_path("data/settings.msgpack");

        assert_eq!(config.keys().version(), "acme_version");
        assert_eq!(config.resolved_store_format(), StoreFormat::MessagePack);
        assert_eq!(
            config.clone().store_format(StoreFormat::Json).resolved_store_format(),
            StoreFormat::Json
        );
    }

    #[test]
    fn test_validation_failures() {
        assert!(PluginConfig::new().option_prefix("").validate().is_err());
        assert!(PluginConfig::new().option_prefix("a b").validate().is_err());
        assert!(PluginConfig::new().running_version("").validate().is_err());
        assert!(PluginConfig::new().settings_url("").validate().is_err());
    }

    #[test]
    fn test_option_keys() {
        let keys = OptionKeys::default();
        assert_eq!(keys.version(), "r34nono_version");
        assert_eq!(keys.previous_version(), "r34nono_previous_version");
        assert_eq!(keys.deferred_admin_notices(), "r34nono_deferred_admin_notices");
        assert_eq!(keys.option("xmlrpc_disabled"), "r34nono_xmlrpc_disabled");
    }

    #[test]
    fn test_from_json_file_partial() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"running_version": "4.0.0", "store_format": "messagepack"}"#,
        )
        .unwrap();

        let config = PluginConfig::from_json_file(&path).unwrap();
        assert_eq!(config.running_version, "4.0.0");
        assert_eq!(config.option_prefix, DEFAULT_OPTION_PREFIX);
        assert_eq!(config.resolved_store_format(), StoreFormat::MessagePack);
    }

    #[test]
    fn test_from_json_file_rejects_bad_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"running_version": ""}"#).unwrap();
        assert!(matches!(
            PluginConfig::from_json_file(&path),
            Err(SettingsError::InvalidConfig(_))
        ));
    }
}
