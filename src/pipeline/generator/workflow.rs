//! Workflow file export.
//!
//! Writes the ordered steps as a YAML document that other tools can load to
//! rebuild the pipeline, rather than as code.

use super::script::portable_path;
use super::Artifact;
use crate::config::GeneratorSettings;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::graph::Operation;
use crate::pipeline::step::Step;
use crate::scene::ArgValue;
use serde::{Deserialize, Serialize};

/// Operation name recorded for read steps.
pub const READ_OPERATION: &str = "imread";

/// Workflow name used when none is given.
pub const DEFAULT_WORKFLOW_NAME: &str = "pipeline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub output: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub args: Vec<ArgValue>,
    #[serde(default)]
    pub categorical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_range: Option<[f64; 2]>,
    /// Set when the operation could not be resolved at export time.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unresolved: bool,
}

/// Tool that wrote the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub tool: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub name: String,
    pub generator: GeneratorInfo,
    pub steps: Vec<WorkflowStep>,
}

/// Exports steps as a workflow document.
#[derive(Debug, Clone)]
pub struct WorkflowExporter {
    settings: GeneratorSettings,
    name: String,
}

impl Default for WorkflowExporter {
    fn default() -> Self {
        Self::new(GeneratorSettings::default())
    }
}

impl WorkflowExporter {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            name: DEFAULT_WORKFLOW_NAME.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn document(&self, steps: &[Step]) -> WorkflowDocument {
        let steps = steps
            .iter()
            .map(|step| {
                let (operation, source, unresolved) = match &step.operation {
                    Operation::Read { source } => (
                        READ_OPERATION.to_string(),
                        Some(
                            source
                                .as_deref()
                                .map(portable_path)
                                .unwrap_or_else(|| step.title.clone()),
                        ),
                        false,
                    ),
                    Operation::Call { name, .. } => (name.clone(), None, false),
                    Operation::Unresolved { name } => (name.clone(), None, true),
                };

                WorkflowStep {
                    output: step.output_name.clone(),
                    operation,
                    source,
                    inputs: step.inputs.clone(),
                    args: step.args.clone(),
                    categorical: step.is_categorical,
                    display_range: step.display_range.map(|r| [r.min, r.max]),
                    unresolved,
                }
            })
            .collect();

        WorkflowDocument {
            name: self.name.clone(),
            generator: GeneratorInfo {
                tool: self.settings.tool_name.clone(),
                version: self.settings.version.clone(),
            },
            steps,
        }
    }

    pub fn export(&self, steps: &[Step]) -> PipelineResult<Artifact> {
        let yaml = serde_yaml::to_string(&self.document(steps))?;
        Ok(Artifact::Text(yaml))
    }
}
