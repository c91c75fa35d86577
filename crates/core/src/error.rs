use thiserror::Error;

use crate::context::ConfigError;
use crate::scene::SnapshotError;

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("no artboard or sub-prefab to export in the current selection")]
    NothingToExport,
    #[error("selected node {0:?} does not exist in the document")]
    UnknownNode(String),
}

/// Failure reported by a filesystem or rasterization collaborator.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("{path}: {source}")]
    Fs {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("rasterizer: {0}")]
    Rasterizer(String),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IoError {
    pub fn fs(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Fs {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop an export before anything is written.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("output: {0}")]
    Io(#[from] IoError),
}
