//! Error types for Arbor

use crate::capability::CapabilityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Resolution stopped at `path[consumed.len()]`.
    #[error("path not found: {} (resolved up to '{}')", .path.join("/"), .consumed.join("/"))]
    PathNotFound {
        path: Vec<String>,
        consumed: Vec<String>,
    },

    #[error("operation {kind} is not supported on '{node}'")]
    UnsupportedOperation { kind: CapabilityKind, node: String },

    #[error("an item named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("container '{name}' is not empty")]
    NotEmpty { name: String },

    #[error("not found: {name}")]
    NotFound { name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("capability {kind} returned an unexpected outcome (expected {expected})")]
    UnexpectedOutcome {
        kind: CapabilityKind,
        expected: &'static str,
    },

    #[error("adapter error: {adapter} - {message}")]
    Adapter { adapter: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn path_not_found(path: &[String], consumed: &[String]) -> Self {
        Self::PathNotFound {
            path: path.to_vec(),
            consumed: consumed.to_vec(),
        }
    }

    pub fn unsupported(kind: CapabilityKind, node: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind,
            node: node.into(),
        }
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn not_empty(name: impl Into<String>) -> Self {
        Self::NotEmpty { name: name.into() }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn adapter(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// True for both a failed resolution and a missing child or attribute.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. } | Self::NotFound { .. })
    }
}
