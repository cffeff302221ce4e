//! Plain annotated Python script.

use super::literal::{python_bool, python_float, python_literal, python_string};
use super::{Artifact, CodeGenerator, Fragment};
use crate::config::GeneratorSettings;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::graph::Operation;
use crate::pipeline::step::Step;
use std::path::Path;

/// Emits a flat script: header, one import, then one block per step.
#[derive(Debug, Clone, Default)]
pub struct ScriptGenerator {
    settings: GeneratorSettings,
}

impl ScriptGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// `alias.name` for a library function.
    pub(crate) fn qualified(&self, name: &str) -> String {
        format!("{}.{}", self.settings.module_alias, name)
    }

    /// The right-hand side of a catalog call:
    /// `cle.op(inputs..., cle.create_like(first), literals...)`.
    pub(crate) fn call_expression(&self, name: &str, output_placeholder: bool, step: &Step) -> String {
        let mut args: Vec<String> = step.inputs.clone();
        if output_placeholder {
            if let Some(first) = step.inputs.first() {
                args.push(format!("{}({})", self.qualified("create_like"), first));
            }
        }
        args.extend(step.args.iter().map(python_literal));
        format!("{}({})", self.qualified(name), args.join(", "))
    }

    /// Assignment for steps that are not plain catalog calls.
    pub(crate) fn fallback_invoke(&self, step: &Step) -> String {
        match &step.operation {
            Operation::Read { source } => {
                let location = match source {
                    Some(path) => portable_path(path),
                    None => step.title.clone(),
                };
                format!(
                    "{} = {}({})",
                    step.output_name,
                    self.qualified("imread"),
                    python_string(&location)
                )
            }
            Operation::Unresolved { name } => format!(
                "# operation {} is not available; its result is left empty\n{} = None",
                python_string(name),
                step.output_name
            ),
            Operation::Call {
                name,
                output_placeholder,
            } => format!(
                "{} = {}",
                step.output_name,
                self.call_expression(name, *output_placeholder, step)
            ),
        }
    }
}

/// Forward slashes so the script runs unchanged on every platform.
pub(crate) fn portable_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl CodeGenerator for ScriptGenerator {
    fn header(&self) -> String {
        let s = &self.settings;
        format!(
            "# To make this script run in cpython, install {package}:\n\
             # pip install {package}\n\
             # Read more:\n\
             # {url}\n\
             #\n\
             # Generator ({tool}) version: {version}\n\
             #",
            package = s.package,
            url = s.docs_url,
            tool = s.tool_name,
            version = s.version,
        )
    }

    fn imports(&self) -> String {
        format!(
            "import {} as {}",
            self.settings.package, self.settings.module_alias
        )
    }

    fn heading(&self, step: &Step) -> Option<String> {
        Some(format!("# {}", step.heading_text()))
    }

    fn invoke(&self, step: &Step, _position: usize) -> String {
        self.fallback_invoke(step)
    }

    fn show(&self, step: &Step) -> Option<String> {
        if matches!(step.operation, Operation::Unresolved { .. }) {
            return None;
        }

        let mut args = vec![
            step.output_name.clone(),
            python_string(&step.title),
            python_bool(step.is_categorical).to_string(),
        ];
        if let Some(range) = step.display_range {
            args.push(python_float(range.min));
            args.push(python_float(range.max));
        }
        Some(format!("{}({})", self.qualified("imshow"), args.join(", ")))
    }

    fn finish(&self, document: Vec<Fragment>) -> PipelineResult<Artifact> {
        let mut text = String::new();
        for fragment in &document {
            text.push_str(fragment.text());
            text.push('\n');
        }
        while text.ends_with("\n\n") {
            text.pop();
        }
        Ok(Artifact::Text(text))
    }

    fn file_extension(&self) -> &'static str {
        "py"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::step::DisplayRange;
    use crate::pipeline::NodeId;
    use crate::scene::ArgValue;

    fn blur_step() -> Step {
        Step {
            node: NodeId(1),
            operation: Operation::Call {
                name: "gaussian_blur".to_string(),
                output_placeholder: true,
            },
            inputs: vec!["image0".to_string()],
            args: vec![ArgValue::Int(1), ArgValue::Int(1), ArgValue::Int(0)],
            output_name: "image1".to_string(),
            title: "Result of gaussian blur".to_string(),
            is_categorical: false,
            display_range: Some(DisplayRange {
                min: 0.0,
                max: 657.0,
            }),
        }
    }

    #[test]
    fn test_invoke_call() {
        let generator = ScriptGenerator::default();
        assert_eq!(
            generator.invoke(&blur_step(), 1),
            "image1 = cle.gaussian_blur(image0, cle.create_like(image0), 1, 1, 0)"
        );
    }

    #[test]
    fn test_invoke_without_placeholder() {
        let generator = ScriptGenerator::default();
        let mut step = blur_step();
        step.operation = Operation::Call {
            name: "label_spots".to_string(),
            output_placeholder: false,
        };
        step.args.clear();
        assert_eq!(generator.invoke(&step, 1), "image1 = cle.label_spots(image0)");
    }

    #[test]
    fn test_invoke_read_uses_forward_slashes() {
        let generator = ScriptGenerator::default();
        let mut step = blur_step();
        step.operation = Operation::Read {
            source: Some("C:\\data\\blobs.tif".into()),
        };
        step.output_name = "image0".to_string();
        assert_eq!(
            generator.invoke(&step, 0),
            "image0 = cle.imread('C:/data/blobs.tif')"
        );
    }

    #[test]
    fn test_invoke_unresolved_is_flagged() {
        let generator = ScriptGenerator::default();
        let mut step = blur_step();
        step.operation = Operation::Unresolved {
            name: "frobnicate".to_string(),
        };
        let code = generator.invoke(&step, 1);
        assert!(code.starts_with("# operation 'frobnicate' is not available"));
        assert!(code.ends_with("image1 = None"));
        assert!(generator.show(&step).is_none());
    }

    #[test]
    fn test_show() {
        let generator = ScriptGenerator::default();
        assert_eq!(
            generator.show(&blur_step()).unwrap(),
            "cle.imshow(image1, 'Result of gaussian blur', False, 0.0, 657.0)"
        );

        let mut labels = blur_step();
        labels.is_categorical = true;
        labels.display_range = None;
        assert_eq!(
            generator.show(&labels).unwrap(),
            "cle.imshow(image1, 'Result of gaussian blur', True)"
        );
    }

    #[test]
    fn test_generate_layout() {
        let generator = ScriptGenerator::default();
        let artifact = generator.generate(&[blur_step()], true).unwrap();
        let text = artifact.as_text().unwrap();

        assert!(text.starts_with("# To make this script run in cpython"));
        assert!(text.contains("import pyclesperanto_prototype as cle\n\n# gaussian blur\n"));
        assert!(text.ends_with("False, 0.0, 657.0)\n"));
    }

    #[test]
    fn test_generate_without_show() {
        let generator = ScriptGenerator::default();
        let artifact = generator.generate(&[blur_step()], false).unwrap();
        assert!(!artifact.as_text().unwrap().contains("imshow"));
    }
}
