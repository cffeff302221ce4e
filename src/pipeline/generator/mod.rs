//! Code generators.
//!
//! Every generator turns the same ordered [`Step`] list into one output
//! format. The traversal lives in [`CodeGenerator::generate`]: it asks the
//! generator for a header and imports, then for each step an optional
//! heading, the invocation and an optional display call, and hands the
//! collected [`Fragment`]s to [`CodeGenerator::finish`] which wraps them in
//! the target syntax.
//!
//! # Targets
//!
//! | Kind       | Generator           | Extension |
//! |------------|---------------------|-----------|
//! | `script`   | [`ScriptGenerator`] | `.py`     |
//! | `notebook` | [`NotebookGenerator`] | `.ipynb` |
//! | `percent`  | [`NotebookGenerator`] (percent format) | `.py` |
//! | `host`     | [`HostGenerator`]   | `.py`     |
//! | `workflow` | [`WorkflowExporter`] | `.yaml`  |

pub mod host;
pub mod literal;
pub mod notebook;
pub mod script;
pub mod workflow;

pub use host::HostGenerator;
pub use notebook::{Cell, NotebookDocument, NotebookFormat, NotebookGenerator};
pub use script::ScriptGenerator;
pub use workflow::{WorkflowDocument, WorkflowExporter};

use crate::pipeline::error::PipelineResult;
use crate::pipeline::step::Step;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output target selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    /// Plain annotated script.
    #[default]
    Script,
    /// Notebook document.
    Notebook,
    /// Script in the percent notebook format (`# %%` cells).
    Percent,
    /// Script for the host's built-in editor, reading from the live scene.
    Host,
    /// Workflow description file.
    Workflow,
}

impl GeneratorKind {
    /// Conventional file extension, without the dot.
    pub fn file_extension(self) -> &'static str {
        match self {
            GeneratorKind::Notebook => "ipynb",
            GeneratorKind::Workflow => "yaml",
            GeneratorKind::Script | GeneratorKind::Percent | GeneratorKind::Host => "py",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GeneratorKind::Script => "Script",
            GeneratorKind::Notebook => "Notebook",
            GeneratorKind::Percent => "Percent-format notebook script",
            GeneratorKind::Host => "Viewer script",
            GeneratorKind::Workflow => "Workflow",
        }
    }

    pub fn all() -> &'static [GeneratorKind] {
        &[
            GeneratorKind::Script,
            GeneratorKind::Notebook,
            GeneratorKind::Percent,
            GeneratorKind::Host,
            GeneratorKind::Workflow,
        ]
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A piece of generated output, before target-specific wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Header or import block.
    Prelude(String),
    /// Human-readable title of the following step.
    Heading(String),
    /// The operation invocation.
    Code(String),
    /// The display call for the step's result.
    Show(String),
    /// End of a block.
    Separator(String),
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Prelude(s)
            | Fragment::Heading(s)
            | Fragment::Code(s)
            | Fragment::Show(s)
            | Fragment::Separator(s) => s,
        }
    }
}

/// Generated output.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Text(String),
    Notebook(NotebookDocument),
}

impl Artifact {
    /// Serialized form, as written to disk.
    pub fn to_text(&self) -> PipelineResult<String> {
        match self {
            Artifact::Text(text) => Ok(text.clone()),
            Artifact::Notebook(doc) => doc.to_json(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Text(text) => Some(text),
            Artifact::Notebook(_) => None,
        }
    }

    pub fn as_notebook(&self) -> Option<&NotebookDocument> {
        match self {
            Artifact::Text(_) => None,
            Artifact::Notebook(doc) => Some(doc),
        }
    }
}

/// Fragment emitter for one output format.
pub trait CodeGenerator {
    /// Documentation block at the top of the output.
    fn header(&self) -> String;

    /// Import statements.
    fn imports(&self) -> String;

    /// Title of a step, if the format shows one.
    fn heading(&self, step: &Step) -> Option<String>;

    /// Code computing the step's result. `position` is the step's index in
    /// the pipeline.
    fn invoke(&self, step: &Step, position: usize) -> String;

    /// Code displaying the step's result, if any.
    fn show(&self, step: &Step) -> Option<String>;

    /// Block separator.
    fn newline(&self) -> String {
        String::new()
    }

    /// Wrap the collected fragments into the final artifact.
    fn finish(&self, document: Vec<Fragment>) -> PipelineResult<Artifact>;

    /// Conventional extension of the artifact, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Traverse `steps` once and build the artifact.
    fn generate(&self, steps: &[Step], show_results: bool) -> PipelineResult<Artifact> {
        let mut document = vec![
            Fragment::Prelude(self.header()),
            Fragment::Prelude(self.imports()),
            Fragment::Separator(self.newline()),
        ];

        for (position, step) in steps.iter().enumerate() {
            if let Some(heading) = self.heading(step) {
                document.push(Fragment::Heading(heading));
            }
            document.push(Fragment::Code(self.invoke(step, position)));
            if show_results {
                if let Some(show) = self.show(step) {
                    document.push(Fragment::Show(show));
                }
            }
            document.push(Fragment::Separator(self.newline()));
        }

        self.finish(document)
    }
}
