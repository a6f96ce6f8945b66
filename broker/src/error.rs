use std::path::PathBuf;

use hopsh_core::InventoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("teleport `tsh` command not found")]
    TshNotFound,

    #[error("`ssh` command not found")]
    SshNotFound,

    #[error("{0} Run `tsh login` first")]
    NotAuthenticated(String),

    #[error("no active profile found, `tsh login` and try again")]
    NoActiveProfile,

    #[error("TELEPORT_PROXY is not valid: {0}")]
    InvalidProxy(String),

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("`{command}` returned invalid data: {message}")]
    InvalidOutput { command: String, message: String },

    #[error("config file {} is invalid: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },
}

impl From<BrokerError> for InventoryError {
    fn from(err: BrokerError) -> Self {
        InventoryError::SourceUnavailable(err.to_string())
    }
}
