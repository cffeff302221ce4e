//! Pipeline-specific error and warning types.

use crate::pipeline::id::NodeId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an export.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cycle detected in pipeline graph between {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("Node {node:?} depends on {input:?}, which has no step")]
    UnresolvedInput { node: NodeId, input: NodeId },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to write {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Conditions that are reported to the caller without aborting the export.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// The node's operation is not in the catalog. Its step is emitted as a
    /// flagged placeholder.
    UnresolvedOperation { node: NodeId, operation: String },

    /// An operation argument points at a node that is not in the scene.
    MissingInput { node: NodeId, input: NodeId },

    /// The artifact was written but running it afterwards failed.
    ExecutionFailed { path: PathBuf, message: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::UnresolvedOperation { node, operation } => {
                write!(f, "{} uses unknown operation '{}'", node, operation)
            }
            PipelineWarning::MissingInput { node, input } => {
                write!(f, "{} reads from {}, which is not in the scene", node, input)
            }
            PipelineWarning::ExecutionFailed { path, message } => {
                write!(f, "could not execute {}: {}", path.display(), message)
            }
        }
    }
}

impl PipelineWarning {
    /// Emit this warning through `tracing`.
    pub(crate) fn log(&self) {
        tracing::warn!("{}", self);
    }
}
