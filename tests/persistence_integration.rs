//! Writing rendered artifacts to disk.

mod common;

use cle_assistant::config::GeneratorSettings;
use cle_assistant::pipeline::generator::WorkflowDocument;
use cle_assistant::pipeline::{GeneratorKind, Pipeline, PipelineError, RenderOptions};
use cle_assistant::pipeline::CommandRunner;
use common::builders::three_node_scene;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn test_script_written_with_extension() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();

    let rendered = pipeline
        .render(GeneratorKind::Script, Some(&dir.path().join("analysis")))
        .unwrap();

    let path = rendered.path.unwrap();
    assert_eq!(path, dir.path().join("analysis.py"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        rendered.artifact.to_text().unwrap()
    );
}

#[test]
fn test_notebook_file_is_valid_json() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();

    let rendered = pipeline
        .render(GeneratorKind::Notebook, Some(&dir.path().join("analysis.ipynb")))
        .unwrap();
    let path = rendered.path.unwrap();
    assert_eq!(path, dir.path().join("analysis.ipynb"));

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["nbformat"], 4);
    let cells = json["cells"].as_array().unwrap();
    // header, then heading + code per step
    assert_eq!(cells.len(), 7);
    for cell in cells {
        assert!(cell.get("cell_type").is_some());
        assert!(cell.get("source").is_some());
    }
}

#[test]
fn test_workflow_file() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();

    let rendered = pipeline
        .render(GeneratorKind::Workflow, Some(&dir.path().join("analysis")))
        .unwrap();
    let path = rendered.path.unwrap();
    assert_eq!(path, dir.path().join("analysis.yaml"));

    let doc: WorkflowDocument =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc.generator.tool, GeneratorSettings::default().tool_name);
    let operations: Vec<&str> = doc.steps.iter().map(|s| s.operation.as_str()).collect();
    assert_eq!(operations, vec!["imread", "gaussian_blur", "threshold_otsu"]);
    assert_eq!(doc.steps[0].source.as_deref(), Some("data/blobs.tif"));
    assert_eq!(doc.steps[2].inputs, vec!["image1".to_string()]);
    assert!(doc.steps[2].categorical);
}

#[test]
fn test_failed_write_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing").join("analysis.py");
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();

    let err = pipeline
        .render(GeneratorKind::Script, Some(&target))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Persist { .. }));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_runner_does_not_fail_export() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();
    let runner = CommandRunner::new("cle-assistant-no-such-runner", Vec::new());

    let options = RenderOptions {
        execute: true,
        ..RenderOptions::default()
    }
    .with_output(dir.path().join("analysis"));
    let rendered = pipeline
        .render_with(GeneratorKind::Notebook, &options, &runner)
        .unwrap();

    assert!(rendered.path.unwrap().exists());
    assert_eq!(rendered.warnings.len(), 1);
}

#[test]
fn test_custom_settings_reach_output() {
    let pipeline = Pipeline::from_scene(&three_node_scene()).unwrap();
    let settings = GeneratorSettings {
        module_alias: "clp".to_string(),
        ..GeneratorSettings::default()
    };

    let artifact = pipeline.generate(GeneratorKind::Script, &settings).unwrap();
    let text = artifact.as_text().unwrap();
    assert!(text.contains("import pyclesperanto_prototype as clp\n"));
    assert!(text.contains("image0 = clp.imread('data/blobs.tif')"));
}
