//! Export entry point.
//!
//! [`Pipeline`] runs extraction, ordering and step building once for a scene
//! snapshot and can then render the steps to any [`GeneratorKind`].

use crate::catalog::{OperationCatalog, StaticCatalog};
use crate::config::GeneratorSettings;
use crate::pipeline::error::{PipelineResult, PipelineWarning};
use crate::pipeline::generator::{
    Artifact, CodeGenerator, GeneratorKind, HostGenerator, NotebookGenerator, ScriptGenerator,
    WorkflowExporter,
};
use crate::pipeline::graph::GraphExtractor;
use crate::pipeline::id::NodeId;
use crate::pipeline::order::TopologicalOrderer;
use crate::pipeline::persist::write_artifact;
use crate::pipeline::runner::{CommandRunner, NotebookRunner};
use crate::pipeline::step::{NamingScheme, Step, StepBuilder};
use crate::scene::Scene;
use std::path::{Path, PathBuf};

/// Options for [`Pipeline::render_with`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub settings: GeneratorSettings,
    /// Write to this path (extension appended if missing).
    pub output: Option<PathBuf>,
    /// Expand a leading `~` in `output`.
    pub expand_home: bool,
    /// Execute written notebooks.
    pub execute: bool,
}

impl RenderOptions {
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }
}

/// Result of a render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub artifact: Artifact,
    /// Where the artifact was written, if it was.
    pub path: Option<PathBuf>,
    /// Extraction warnings plus any raised while rendering.
    pub warnings: Vec<PipelineWarning>,
}

/// Ordered steps of one export.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
    show_results: bool,
    /// Node selected in the host when the snapshot was taken.
    selected: Option<NodeId>,
    warnings: Vec<PipelineWarning>,
}

impl Pipeline {
    /// Build from a scene using the built-in catalog.
    pub fn from_scene(scene: &Scene) -> PipelineResult<Self> {
        Self::from_scene_with(scene, &StaticCatalog::builtin(), NamingScheme::default())
    }

    pub fn from_scene_with(
        scene: &Scene,
        catalog: &dyn OperationCatalog,
        naming: NamingScheme,
    ) -> PipelineResult<Self> {
        let extraction = GraphExtractor::new(catalog).extract(scene);
        let order = TopologicalOrderer::order(&extraction.graph)?;
        let steps = StepBuilder::new(naming).build(&extraction.graph, &order)?;

        tracing::debug!(
            "Built pipeline with {} steps, {} warnings",
            steps.len(),
            extraction.warnings.len()
        );

        Ok(Self {
            steps,
            show_results: true,
            selected: scene.selected,
            warnings: extraction.warnings,
        })
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self {
            steps,
            show_results: true,
            selected: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_selected(mut self, selected: Option<NodeId>) -> Self {
        self.selected = selected;
        self
    }

    /// The read step fed from the viewer's active layer in host scripts:
    /// the selected node when it is a read, otherwise none (the first step
    /// is used).
    pub fn entry_read(&self) -> Option<NodeId> {
        let selected = self.selected?;
        self.steps
            .iter()
            .find(|s| s.node == selected && s.operation.is_read())
            .map(|s| s.node)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    pub fn show_results(&self) -> bool {
        self.show_results
    }

    pub fn with_show_results(mut self, show: bool) -> Self {
        self.show_results = show;
        self
    }

    pub fn set_show_results(&mut self, show: bool) {
        self.show_results = show;
    }

    /// Render to `kind`, writing to `filename` when given.
    pub fn render(&self, kind: GeneratorKind, filename: Option<&Path>) -> PipelineResult<Rendered> {
        let options = RenderOptions {
            output: filename.map(Path::to_path_buf),
            ..RenderOptions::default()
        };
        self.render_with(kind, &options, &CommandRunner::default())
    }

    /// Generate without writing anything.
    pub fn generate(&self, kind: GeneratorKind, settings: &GeneratorSettings) -> PipelineResult<Artifact> {
        match kind {
            GeneratorKind::Workflow => WorkflowExporter::new(settings.clone()).export(&self.steps),
            GeneratorKind::Host => HostGenerator::new(settings.clone())
                .with_entry(self.entry_read())
                .generate(&self.steps, self.show_results),
            _ => generator_for(kind, settings).generate(&self.steps, self.show_results),
        }
    }

    /// Render with explicit options. Notebook execution goes through
    /// `runner` and never fails the render.
    ///
    /// # Errors
    /// Generation errors and [`PipelineError::Persist`](crate::pipeline::PipelineError::Persist)
    /// when the artifact cannot be written.
    pub fn render_with(
        &self,
        kind: GeneratorKind,
        options: &RenderOptions,
        runner: &dyn NotebookRunner,
    ) -> PipelineResult<Rendered> {
        let artifact = self.generate(kind, &options.settings)?;
        let mut warnings = self.warnings.clone();

        let path = match &options.output {
            Some(output) => Some(write_artifact(
                &artifact,
                output,
                kind.file_extension(),
                options.expand_home,
            )?),
            None => None,
        };

        if let (Some(path), true) = (&path, options.execute && kind == GeneratorKind::Notebook) {
            if let Err(e) = runner.run(path) {
                let warning = PipelineWarning::ExecutionFailed {
                    path: path.clone(),
                    message: e.to_string(),
                };
                warning.log();
                warnings.push(warning);
            }
        }

        Ok(Rendered {
            artifact,
            path,
            warnings,
        })
    }
}

/// Generator for every kind except [`GeneratorKind::Workflow`], which is
/// handled by [`WorkflowExporter`].
pub fn generator_for(kind: GeneratorKind, settings: &GeneratorSettings) -> Box<dyn CodeGenerator> {
    let settings = settings.clone();
    match kind {
        GeneratorKind::Notebook => Box::new(NotebookGenerator::new(settings)),
        GeneratorKind::Percent => Box::new(NotebookGenerator::percent(settings)),
        GeneratorKind::Host => Box::new(HostGenerator::new(settings)),
        GeneratorKind::Script | GeneratorKind::Workflow => Box::new(ScriptGenerator::new(settings)),
    }
}
