use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ModelError> = core::result::Result<T, E>;

/// Failures that stop a device tool from being built.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unable to read {what}: {}", .path.display())]
    Resource {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no bundled {what} for {key}")]
    MissingResource { what: &'static str, key: String },
    #[error("model number {0} is not listed in the model index")]
    UnknownModelNumber(u16),
    #[error("control table has no item named {0:?}")]
    UnknownControlItem(String),
    #[error("invalid source config: {0}")]
    Config(#[from] serde_yaml::Error),
}

/// Why a single descriptor row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("unknown access type {0:?}")]
    UnknownAccess(String),
    #[error("unknown memory region {0:?}")]
    UnknownMemory(String),
}
