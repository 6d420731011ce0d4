//! Typed errors surfaced to the user by the core operations

use std::path::PathBuf;

/// Missing input or a rejected request; never changes any state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Python script not selected! Please select a Python script file to compile.")]
    MissingScript,

    #[error("A build is already running. Please wait.")]
    BuildAlreadyRunning,
}

/// Profile file read/write failure
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Failed to access profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
}
