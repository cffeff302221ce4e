//! Dependency graph extraction.
//!
//! [`GraphExtractor`] walks a [`Scene`] snapshot once and records, for every
//! node produced by an operation, which operation it was, which nodes fed it
//! and which literal arguments were used. Inputs without a producing
//! operation (data opened from a file) get a synthesized read entry so the
//! graph is self-contained.

use crate::catalog::OperationCatalog;
use crate::pipeline::error::PipelineWarning;
use crate::pipeline::id::NodeId;
use crate::scene::{ArgValue, Argument, Scene, SceneNode};
use std::collections::HashMap;
use std::path::PathBuf;

/// Name given to read entries whose node is missing from the scene.
const UNKNOWN_SOURCE_NAME: &str = "image";

/// What a graph entry does.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Acquire data from outside the pipeline: a file when `source` is known,
    /// otherwise whatever the host provides.
    Read { source: Option<PathBuf> },
    /// A catalog operation.
    Call {
        name: String,
        output_placeholder: bool,
    },
    /// An operation the catalog does not know.
    Unresolved { name: String },
}

impl Operation {
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::Read { .. })
    }

    /// Operation name, `None` for reads.
    pub fn name(&self) -> Option<&str> {
        match self {
            Operation::Read { .. } => None,
            Operation::Call { name, .. } | Operation::Unresolved { name } => Some(name),
        }
    }
}

/// One node of the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEntry {
    /// Display name of the originating scene node.
    pub name: String,
    pub operation: Operation,
    /// Producing nodes of the image inputs, in argument order.
    pub inputs: Vec<NodeId>,
    pub args: Vec<ArgValue>,
    pub categorical: bool,
    pub display_range: Option<(f64, f64)>,
}

impl GraphEntry {
    pub fn read(name: impl Into<String>, source: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Read { source },
            inputs: Vec::new(),
            args: Vec::new(),
            categorical: false,
            display_range: None,
        }
    }

    pub fn call(name: impl Into<String>, operation: &str, inputs: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            operation: Operation::Call {
                name: operation.to_string(),
                output_placeholder: true,
            },
            inputs,
            args: Vec::new(),
            categorical: false,
            display_range: None,
        }
    }

    pub fn with_args(mut self, args: Vec<ArgValue>) -> Self {
        self.args = args;
        self
    }

    pub fn categorical(mut self) -> Self {
        self.categorical = true;
        self
    }

    pub fn with_display_range(mut self, min: f64, max: f64) -> Self {
        self.display_range = Some((min, max));
        self
    }
}

/// Dependency graph keyed by node identity. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    entries: Vec<(NodeId, GraphEntry)>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, id: NodeId, entry: GraphEntry) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push((id, entry));
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&GraphEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Insertion position of `id`.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GraphEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

/// Result of one extraction.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub graph: Graph,
    pub warnings: Vec<PipelineWarning>,
}

/// Builds a [`Graph`] from a scene snapshot.
pub struct GraphExtractor<'a> {
    catalog: &'a dyn OperationCatalog,
}

impl<'a> GraphExtractor<'a> {
    pub fn new(catalog: &'a dyn OperationCatalog) -> Self {
        Self { catalog }
    }

    pub fn extract(&self, scene: &Scene) -> Extraction {
        let mut out = Extraction::default();

        for node in &scene.nodes {
            let Some(record) = &node.operation else {
                continue;
            };

            let mut slots: Vec<Option<NodeId>> = Vec::new();
            let mut literals = Vec::new();
            for arg in &record.args {
                match arg {
                    Argument::Node(input) => {
                        slots.push(Some(self.producer_of(*input, node.id, scene, &mut out)))
                    }
                    Argument::Unset => slots.push(None),
                    Argument::Literal(value) => literals.push(value.clone()),
                }
            }

            // Unset image inputs reuse the first one that was set.
            let first = slots.iter().flatten().next().copied();
            let mut inputs: Vec<NodeId> = match first {
                Some(first) => slots.iter().map(|s| s.unwrap_or(first)).collect(),
                None => Vec::new(),
            };

            let entry = match self.catalog.resolve(&record.name) {
                Some(spec) => {
                    if let Some(first) = first {
                        while inputs.len() < spec.image_inputs {
                            inputs.push(first);
                        }
                    }
                    GraphEntry {
                        name: node.name.clone(),
                        operation: Operation::Call {
                            name: spec.name.clone(),
                            output_placeholder: spec.output_placeholder,
                        },
                        inputs,
                        args: spec.literal_args(&literals),
                        categorical: node.is_categorical() || spec.output.is_categorical(),
                        display_range: range_of(node),
                    }
                }
                None => {
                    let warning = PipelineWarning::UnresolvedOperation {
                        node: node.id,
                        operation: record.name.clone(),
                    };
                    warning.log();
                    out.warnings.push(warning);
                    GraphEntry {
                        name: node.name.clone(),
                        operation: Operation::Unresolved {
                            name: record.name.clone(),
                        },
                        inputs,
                        args: literals,
                        categorical: node.is_categorical(),
                        display_range: range_of(node),
                    }
                }
            };

            tracing::debug!(
                "Extracted {} '{}' with {} input(s)",
                node.id,
                record.name,
                entry.inputs.len()
            );
            out.graph.insert(node.id, entry);
        }

        out
    }

    /// Graph key of the node that produced `input`, synthesizing a read
    /// entry when nothing in the scene computed it.
    fn producer_of(
        &self,
        input: NodeId,
        consumer: NodeId,
        scene: &Scene,
        out: &mut Extraction,
    ) -> NodeId {
        if out.graph.contains(input) {
            return input;
        }

        match scene.node(input) {
            Some(node) if node.operation.is_some() => input,
            Some(node) => {
                let mut entry = GraphEntry::read(node.name.clone(), node.source.clone());
                entry.categorical = node.is_categorical();
                entry.display_range = range_of(node);
                out.graph.insert(input, entry);
                input
            }
            None => {
                let warning = PipelineWarning::MissingInput {
                    node: consumer,
                    input,
                };
                warning.log();
                out.warnings.push(warning);
                out.graph
                    .insert(input, GraphEntry::read(UNKNOWN_SOURCE_NAME, None));
                input
            }
        }
    }
}

fn range_of(node: &SceneNode) -> Option<(f64, f64)> {
    node.display_range.map(|[min, max]| (min, max))
}
