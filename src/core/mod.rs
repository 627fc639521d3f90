pub mod error;
pub mod value;
pub mod version;

pub use error::{Result, SettingsError};
pub use value::{OptionValue, field_is_truthy, is_truthy};
pub use version::{PluginVersion, is_older};
