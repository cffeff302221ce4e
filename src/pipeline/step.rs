//! Generation-ready pipeline steps.
//!
//! A [`Step`] is a graph entry with its inputs resolved to the output names
//! of earlier steps. Once built, steps no longer refer to the graph or the
//! scene, so generators work from the step list alone.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::graph::{Graph, Operation};
use crate::pipeline::id::NodeId;
use crate::scene::ArgValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Upper display bound used when the computed one would be degenerate.
pub const MIN_DISPLAY_MAX: f64 = 1.0;

/// Identifiers generated code already uses.
const RESERVED_NAMES: &[&str] = &["cle", "viewer", "image", "imread", "imshow", "np"];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Prefix the host puts in front of result names.
const RESULT_PREFIX: &str = "Result of ";

/// Contrast limits used to show a non-categorical result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    /// Build a range that is safe to scale by: non-finite bounds fall back to
    /// `0..MIN_DISPLAY_MAX`, a zero maximum becomes `MIN_DISPLAY_MAX`, and a
    /// maximum at or below the minimum is lifted above it.
    pub fn sanitized(min: f64, max: f64) -> Self {
        if !min.is_finite() || !max.is_finite() {
            return Self {
                min: 0.0,
                max: MIN_DISPLAY_MAX,
            };
        }
        let mut max = max;
        if max == 0.0 {
            max = MIN_DISPLAY_MAX;
        }
        if max <= min {
            max = min + MIN_DISPLAY_MAX;
        }
        Self { min, max }
    }
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: MIN_DISPLAY_MAX,
        }
    }
}

/// How step output identifiers are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
    /// `image0`, `image1`, … by position in the order.
    #[default]
    Sequential,
    /// Derived from the node's display name, suffixed on collision.
    DisplayName,
}

/// One stage of the exported pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Scene node the step was built from.
    pub node: NodeId,
    pub operation: Operation,
    /// Output names of the steps feeding this one, in argument order.
    pub inputs: Vec<String>,
    pub args: Vec<ArgValue>,
    pub output_name: String,
    /// Display name of the originating node.
    pub title: String,
    pub is_categorical: bool,
    /// Always `None` for categorical steps.
    pub display_range: Option<DisplayRange>,
}

impl Step {
    /// Title without the host's "Result of" prefix, used for headings.
    /// Control characters become spaces so the heading stays on one line.
    pub fn heading_text(&self) -> String {
        self.title
            .strip_prefix(RESULT_PREFIX)
            .unwrap_or(&self.title)
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    }
}

/// Resolves an ordered graph into steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepBuilder {
    naming: NamingScheme,
}

impl StepBuilder {
    pub fn new(naming: NamingScheme) -> Self {
        Self { naming }
    }

    /// Build one step per id of `order`.
    ///
    /// # Errors
    /// [`PipelineError::UnresolvedInput`] when an input has no step yet,
    /// meaning `order` does not respect the graph's dependencies.
    pub fn build(&self, graph: &Graph, order: &[NodeId]) -> PipelineResult<Vec<Step>> {
        let mut names: HashMap<NodeId, String> = HashMap::with_capacity(order.len());
        let mut taken: HashSet<String> = RESERVED_NAMES.iter().map(|s| s.to_string()).collect();
        let mut steps = Vec::with_capacity(order.len());

        for &id in order {
            let Some(entry) = graph.get(id) else {
                tracing::debug!("{} is not in the graph, skipping", id);
                continue;
            };

            let inputs = entry
                .inputs
                .iter()
                .map(|input| {
                    names
                        .get(input)
                        .cloned()
                        .ok_or(PipelineError::UnresolvedInput {
                            node: id,
                            input: *input,
                        })
                })
                .collect::<PipelineResult<Vec<_>>>()?;

            let output_name = match self.naming {
                NamingScheme::Sequential => format!("image{}", steps.len()),
                NamingScheme::DisplayName => unique_identifier(&entry.name, &mut taken),
            };
            names.insert(id, output_name.clone());

            let display_range = if entry.categorical {
                None
            } else {
                Some(
                    entry
                        .display_range
                        .map(|(min, max)| DisplayRange::sanitized(min, max))
                        .unwrap_or_default(),
                )
            };

            steps.push(Step {
                node: id,
                operation: entry.operation.clone(),
                inputs,
                args: entry.args.clone(),
                output_name,
                title: entry.name.clone(),
                is_categorical: entry.categorical,
                display_range,
            });
        }

        Ok(steps)
    }
}

/// Build steps with sequential names.
pub fn build_steps(graph: &Graph, order: &[NodeId]) -> PipelineResult<Vec<Step>> {
    StepBuilder::default().build(graph, order)
}

/// Turn a display name into a Python identifier that is not in `taken`,
/// and mark it taken.
fn unique_identifier(display_name: &str, taken: &mut HashSet<String>) -> String {
    let trimmed = display_name
        .strip_prefix(RESULT_PREFIX)
        .unwrap_or(display_name);

    let mut base = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
        } else if !base.ends_with('_') {
            base.push('_');
        }
    }
    let mut base = base.trim_matches('_').to_string();

    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base = format!("image_{}", base).trim_end_matches('_').to_string();
    }
    if PYTHON_KEYWORDS.contains(&base.as_str()) {
        base.push('_');
    }

    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
