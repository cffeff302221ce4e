//! Read-only snapshot of the host viewer's scene.
//!
//! The export pipeline never touches live widgets or layers. A host adapter
//! translates the viewer state into a [`Scene`] once, at export time, and the
//! pipeline consumes that snapshot. Snapshots round-trip through JSON so the
//! command line tool can export a pipeline captured elsewhere.
//!
//! # Example snapshot
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": 0, "name": "blobs", "source": "data/blobs.tif",
//!       "display_range": [8.0, 248.0] },
//!     { "id": 1, "name": "Result of gaussian blur",
//!       "display_range": [0.0, 120.0],
//!       "operation": { "name": "gaussian_blur",
//!                      "args": [ { "node": 0 }, { "literal": 1 },
//!                                { "literal": 1 }, { "literal": 0 } ] } }
//!   ]
//! }
//! ```

use crate::error::{AssistantError, Result};
use crate::pipeline::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How the host displays a node's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Continuous intensities shown with a contrast range.
    #[default]
    Image,
    /// Discrete object identities (categorical data).
    Labels,
}

impl LayerKind {
    pub fn is_categorical(self) -> bool {
        matches!(self, LayerKind::Labels)
    }
}

/// A literal (non-image) argument value as set in the host's widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Float(v) => write!(f, "{:?}", v),
            ArgValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(v as i64)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

/// One positional argument of an applied operation, in widget order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    /// An image-like input taken from another scene node.
    Node(NodeId),
    /// An image-like input the user left empty.
    Unset,
    /// A literal parameter.
    Literal(ArgValue),
}

/// Which operation produced a node, and with which arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Argument>,
}

impl OperationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn input(mut self, node: NodeId) -> Self {
        self.args.push(Argument::Node(node));
        self
    }

    pub fn unset_input(mut self) -> Self {
        self.args.push(Argument::Unset);
        self
    }

    pub fn literal(mut self, value: impl Into<ArgValue>) -> Self {
        self.args.push(Argument::Literal(value.into()));
        self
    }
}

/// A node of the host scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    /// Contrast limits as displayed by the host, `[min, max]`.
    #[serde(default)]
    pub display_range: Option<[f64; 2]>,
    /// File the data was opened from, if any.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Set when the node is the result of an operation.
    #[serde(default)]
    pub operation: Option<OperationRecord>,
}

impl SceneNode {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LayerKind::Image,
            display_range: None,
            source: None,
            operation: None,
        }
    }

    pub fn labels(mut self) -> Self {
        self.kind = LayerKind::Labels;
        self
    }

    pub fn with_display_range(mut self, min: f64, max: f64) -> Self {
        self.display_range = Some([min, max]);
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn with_operation(mut self, operation: OperationRecord) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn is_categorical(&self) -> bool {
        self.kind.is_categorical()
    }
}

/// Point-in-time snapshot of every node in the host viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    /// The node currently selected in the host, if any.
    #[serde(default)]
    pub selected: Option<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: SceneNode) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn with_node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| AssistantError::Scene(format!("Failed to parse scene snapshot: {}", e)))
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Scene(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let json = r#"{
            "nodes": [
                { "id": 0, "name": "blobs", "source": "blobs.tif", "display_range": [8.0, 248.0] },
                { "id": 1, "name": "Result of threshold otsu", "kind": "labels",
                  "operation": { "name": "threshold_otsu", "args": [ { "node": 0 } ] } },
                { "id": 2, "name": "Result of binary and",
                  "operation": { "name": "binary_and",
                                 "args": [ { "node": 1 }, "unset", { "literal": 2.5 }, { "literal": "x" } ] } }
            ],
            "selected": 0
        }"#;

        let scene = Scene::from_json_str(json).unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.selected, Some(NodeId(0)));
        assert!(scene.node(NodeId(1)).unwrap().is_categorical());
        assert_eq!(
            scene.node(NodeId(0)).unwrap().source.as_deref(),
            Some(Path::new("blobs.tif"))
        );

        let op = scene.node(NodeId(2)).unwrap().operation.as_ref().unwrap();
        assert_eq!(
            op.args,
            vec![
                Argument::Node(NodeId(1)),
                Argument::Unset,
                Argument::Literal(ArgValue::Float(2.5)),
                Argument::Literal(ArgValue::Str("x".to_string())),
            ]
        );
    }

    #[test]
    fn test_integer_literal_stays_integer() {
        let arg: Argument = serde_json::from_str(r#"{ "literal": 1 }"#).unwrap();
        assert_eq!(arg, Argument::Literal(ArgValue::Int(1)));
    }

    #[test]
    fn test_invalid_snapshot_is_scene_error() {
        let err = Scene::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, AssistantError::Scene(_)));
    }

    #[test]
    fn test_builder_methods() {
        let scene = Scene::new()
            .with_node(SceneNode::new(0, "raw").with_source("raw.tif"))
            .with_node(
                SceneNode::new(1, "mask")
                    .labels()
                    .with_operation(OperationRecord::new("threshold_otsu").input(NodeId(0))),
            );
        assert_eq!(scene.len(), 2);
        assert!(scene.node(NodeId(5)).is_none());
    }
}
