use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid version string: '{0}'")]
    InvalidVersion(String),

    #[error("Invalid migration plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

impl<T> From<std::sync::PoisonError<T>> for SettingsError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
