//! Script for the viewer's built-in editor.
//!
//! Same shape as the plain script, but inputs come from the live viewer
//! instead of files, and results are pushed back into the viewer as layers.

use super::literal::{python_float, python_string};
use super::script::ScriptGenerator;
use super::{Artifact, CodeGenerator, Fragment};
use crate::config::GeneratorSettings;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::graph::Operation;
use crate::pipeline::id::NodeId;
use crate::pipeline::step::Step;

#[derive(Debug, Clone, Default)]
pub struct HostGenerator {
    script: ScriptGenerator,
    /// Read step that takes the viewer's active layer. Without one, the
    /// first step does.
    entry: Option<NodeId>,
}

impl HostGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            script: ScriptGenerator::new(settings),
            entry: None,
        }
    }

    pub fn with_entry(mut self, entry: Option<NodeId>) -> Self {
        self.entry = entry;
        self
    }

    fn is_entry(&self, step: &Step, position: usize) -> bool {
        match self.entry {
            Some(node) => step.node == node,
            None => position == 0,
        }
    }

    fn viewer(&self) -> &str {
        &self.script.settings().viewer_variable
    }
}

impl CodeGenerator for HostGenerator {
    fn header(&self) -> String {
        format!(
            "{}\n# Run this script from the viewer's script editor; `{}` refers to the open viewer.\n#",
            self.script.header(),
            self.viewer()
        )
    }

    fn imports(&self) -> String {
        self.script.imports()
    }

    fn heading(&self, step: &Step) -> Option<String> {
        self.script.heading(step)
    }

    fn invoke(&self, step: &Step, position: usize) -> String {
        match &step.operation {
            Operation::Read { .. } if self.is_entry(step, position) => format!(
                "{} = {}({}.layers.selection.active.data)",
                step.output_name,
                self.script.qualified("push"),
                self.viewer()
            ),
            Operation::Read { .. } => format!(
                "{} = {}({}.layers[{}].data)",
                step.output_name,
                self.script.qualified("push"),
                self.viewer(),
                python_string(&step.title)
            ),
            _ => self.script.invoke(step, position),
        }
    }

    fn show(&self, step: &Step) -> Option<String> {
        if matches!(step.operation, Operation::Unresolved { .. }) {
            return None;
        }

        let viewer = self.viewer();
        let name = python_string(&step.title);
        let data = format!("{}({})", self.script.qualified("pull"), step.output_name);
        let create = match step.display_range {
            Some(range) if !step.is_categorical => format!(
                "{}.add_image({}, name={}, contrast_limits=({}, {}))",
                viewer,
                data,
                name,
                python_float(range.min),
                python_float(range.max)
            ),
            _ if step.is_categorical => {
                format!("{}.add_labels({}, name={})", viewer, data, name)
            }
            _ => format!("{}.add_image({}, name={})", viewer, data, name),
        };

        Some(format!(
            "if {name} in {viewer}.layers:\n    {viewer}.layers[{name}].data = {data}\nelse:\n    {create}",
        ))
    }

    fn finish(&self, document: Vec<Fragment>) -> PipelineResult<Artifact> {
        self.script.finish(document)
    }

    fn file_extension(&self) -> &'static str {
        "py"
    }
}
