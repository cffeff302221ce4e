//! Notebook generator.
//!
//! Produces a minimal nbformat 4 document: markdown cells for step headings
//! and code cells for the header, each invocation and its display call. The
//! same cells can instead be written as a percent-format script, which
//! notebook tools convert back into a notebook.

use super::script::ScriptGenerator;
use super::{Artifact, CodeGenerator, Fragment};
use crate::config::GeneratorSettings;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::step::Step;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NBFORMAT: u32 = 4;
pub const NBFORMAT_MINOR: u32 = 4;

/// A notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum Cell {
    Markdown {
        #[serde(default)]
        metadata: Map<String, Value>,
        source: Vec<String>,
    },
    Code {
        execution_count: Option<u32>,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        outputs: Vec<Value>,
        source: Vec<String>,
    },
}

impl Cell {
    pub fn markdown(text: &str) -> Self {
        Cell::Markdown {
            metadata: Map::new(),
            source: source_lines(text),
        }
    }

    pub fn code(text: &str) -> Self {
        Cell::Code {
            execution_count: None,
            metadata: Map::new(),
            outputs: Vec::new(),
            source: source_lines(text),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Cell::Code { .. })
    }

    /// Cell text with its lines joined back together.
    pub fn text(&self) -> String {
        match self {
            Cell::Markdown { source, .. } | Cell::Code { source, .. } => source.concat(),
        }
    }
}

/// Split text the way notebooks store it: every line keeps its newline
/// except the last.
fn source_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    pub language: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub file_extension: String,
    pub mimetype: String,
    pub nbconvert_exporter: String,
    pub pygments_lexer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    pub kernelspec: KernelSpec,
    pub language_info: LanguageInfo,
}

impl Default for NotebookMetadata {
    fn default() -> Self {
        Self {
            kernelspec: KernelSpec {
                display_name: "Python 3".to_string(),
                language: "python".to_string(),
                name: "python3".to_string(),
            },
            language_info: LanguageInfo {
                name: "python".to_string(),
                file_extension: ".py".to_string(),
                mimetype: "text/x-python".to_string(),
                nbconvert_exporter: "python".to_string(),
                pygments_lexer: "ipython3".to_string(),
            },
        }
    }
}

/// A notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookDocument {
    pub cells: Vec<Cell>,
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    pub nbformat_minor: u32,
}

impl NotebookDocument {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: NotebookMetadata::default(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn code_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_code())
    }

    /// Render as a percent-format script.
    pub fn to_percent_script(&self) -> String {
        let mut out = String::new();
        for cell in &self.cells {
            match cell {
                Cell::Markdown { .. } => {
                    out.push_str("# %% [markdown]\n");
                    for line in cell.text().lines() {
                        if line.is_empty() {
                            out.push_str("#\n");
                        } else {
                            out.push_str("# ");
                            out.push_str(line);
                            out.push('\n');
                        }
                    }
                }
                Cell::Code { .. } => {
                    out.push_str("# %%\n");
                    out.push_str(&cell.text());
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}

/// How the notebook is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotebookFormat {
    /// JSON notebook document.
    #[default]
    Ipynb,
    /// Percent-format script.
    Percent,
}

/// Wraps the script fragments into notebook cells.
#[derive(Debug, Clone, Default)]
pub struct NotebookGenerator {
    script: ScriptGenerator,
    format: NotebookFormat,
}

impl NotebookGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            script: ScriptGenerator::new(settings),
            format: NotebookFormat::Ipynb,
        }
    }

    pub fn percent(settings: GeneratorSettings) -> Self {
        Self {
            script: ScriptGenerator::new(settings),
            format: NotebookFormat::Percent,
        }
    }

    pub fn format(&self) -> NotebookFormat {
        self.format
    }
}

impl CodeGenerator for NotebookGenerator {
    fn header(&self) -> String {
        self.script.header()
    }

    fn imports(&self) -> String {
        self.script.imports()
    }

    fn heading(&self, step: &Step) -> Option<String> {
        Some(format!("## {}", step.heading_text()))
    }

    fn invoke(&self, step: &Step, position: usize) -> String {
        self.script.invoke(step, position)
    }

    fn show(&self, step: &Step) -> Option<String> {
        self.script.show(step)
    }

    fn finish(&self, document: Vec<Fragment>) -> PipelineResult<Artifact> {
        let mut cells = Vec::new();
        let mut code: Vec<&str> = Vec::new();

        for fragment in &document {
            match fragment {
                Fragment::Heading(text) => {
                    flush_code(&mut code, &mut cells);
                    cells.push(Cell::markdown(text));
                }
                Fragment::Prelude(text) | Fragment::Code(text) | Fragment::Show(text) => {
                    code.push(text)
                }
                Fragment::Separator(_) => flush_code(&mut code, &mut cells),
            }
        }
        flush_code(&mut code, &mut cells);

        let doc = NotebookDocument::new(cells);
        Ok(match self.format {
            NotebookFormat::Ipynb => Artifact::Notebook(doc),
            NotebookFormat::Percent => Artifact::Text(doc.to_percent_script()),
        })
    }

    fn file_extension(&self) -> &'static str {
        match self.format {
            NotebookFormat::Ipynb => "ipynb",
            NotebookFormat::Percent => "py",
        }
    }
}

fn flush_code(code: &mut Vec<&str>, cells: &mut Vec<Cell>) {
    if !code.is_empty() {
        cells.push(Cell::code(&code.join("\n")));
        code.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::graph::Operation;
    use crate::pipeline::step::DisplayRange;
    use crate::pipeline::NodeId;

    fn steps() -> Vec<Step> {
        vec![
            Step {
                node: NodeId(0),
                operation: Operation::Read {
                    source: Some("blobs.tif".into()),
                },
                inputs: Vec::new(),
                args: Vec::new(),
                output_name: "image0".to_string(),
                title: "blobs".to_string(),
                is_categorical: false,
                display_range: Some(DisplayRange {
                    min: 8.0,
                    max: 248.0,
                }),
            },
            Step {
                node: NodeId(1),
                operation: Operation::Call {
                    name: "threshold_otsu".to_string(),
                    output_placeholder: true,
                },
                inputs: vec!["image0".to_string()],
                args: Vec::new(),
                output_name: "image1".to_string(),
                title: "Result of threshold otsu".to_string(),
                is_categorical: true,
                display_range: None,
            },
        ]
    }

    #[test]
    fn test_cells_alternate() {
        let artifact = NotebookGenerator::default().generate(&steps(), true).unwrap();
        let doc = artifact.as_notebook().unwrap();

        let kinds: Vec<bool> = doc.cells.iter().map(Cell::is_code).collect();
        assert_eq!(kinds, vec![true, false, true, false, true]);

        assert_eq!(doc.cells[1].text(), "## blobs");
        assert_eq!(doc.cells[3].text(), "## threshold otsu");
        assert_eq!(
            doc.cells[4].text(),
            "image1 = cle.threshold_otsu(image0, cle.create_like(image0))\n\
             cle.imshow(image1, 'Result of threshold otsu', True)"
        );
    }

    #[test]
    fn test_header_cell_contains_import() {
        let artifact = NotebookGenerator::default().generate(&[], true).unwrap();
        let doc = artifact.as_notebook().unwrap();
        assert_eq!(doc.cells.len(), 1);
        assert!(doc.cells[0]
            .text()
            .ends_with("import pyclesperanto_prototype as cle"));
    }

    #[test]
    fn test_json_structure() {
        let artifact = NotebookGenerator::default().generate(&steps(), true).unwrap();
        let json: Value = serde_json::from_str(&artifact.to_text().unwrap()).unwrap();

        assert_eq!(json["nbformat"], 4);
        assert_eq!(json["nbformat_minor"], 4);
        assert_eq!(json["metadata"]["kernelspec"]["name"], "python3");

        let cells = json["cells"].as_array().unwrap();
        for cell in cells {
            assert!(cell["source"].is_array());
            assert!(cell["metadata"].is_object());
            if cell["cell_type"] == "code" {
                assert!(cell["execution_count"].is_null());
                assert_eq!(cell["outputs"], Value::Array(Vec::new()));
            } else {
                assert_eq!(cell["cell_type"], "markdown");
                assert!(cell.get("outputs").is_none());
            }
        }
    }

    #[test]
    fn test_json_round_trip_preserves_cells() {
        let artifact = NotebookGenerator::default().generate(&steps(), true).unwrap();
        let doc = artifact.as_notebook().unwrap();
        let back: NotebookDocument = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(&back, doc);
    }

    #[test]
    fn test_source_lines_keep_newlines() {
        assert_eq!(
            source_lines("a\nb\nc"),
            vec!["a\n".to_string(), "b\n".to_string(), "c".to_string()]
        );
        assert!(source_lines("").is_empty());
    }

    #[test]
    fn test_percent_format() {
        let generator = NotebookGenerator::percent(GeneratorSettings::default());
        assert_eq!(generator.file_extension(), "py");

        let artifact = generator.generate(&steps(), false).unwrap();
        let text = artifact.as_text().unwrap();
        assert!(text.starts_with("# %%\n# To make this script run"));
        assert!(text.contains("# %% [markdown]\n# ## blobs\n\n# %%\nimage0 = cle.imread('blobs.tif')\n"));
        assert!(text.ends_with("image1 = cle.threshold_otsu(image0, cle.create_like(image0))\n"));
    }
}
