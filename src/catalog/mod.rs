//! Operation catalog.
//!
//! The catalog maps a stable operation name to what the export pipeline
//! needs to know about it: how many image inputs it takes, which literal
//! parameters follow them (in declaration order, with defaults), whether the
//! call expects a pre-allocated output buffer, and whether its result is
//! categorical. Nothing here executes an operation.
//!
//! A built-in catalog covers the default operation of every category offered
//! by the assistant. Users can supply their own catalog as TOML:
//!
//! ```toml
//! [[operation]]
//! name = "gaussian_blur"
//! category = "Noise removal"
//! image_inputs = 1
//! params = [
//!     { name = "sigma_x", kind = "float", default = 1.0 },
//!     { name = "sigma_y", kind = "float", default = 1.0 },
//!     { name = "sigma_z", kind = "float", default = 0.0 },
//! ]
//! ```

use crate::scene::ArgValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Name the host GUI uses before the user has picked an operation.
pub const PLACEHOLDER_OPERATION: &str = "please_select";

/// Errors raised while building a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Operation '{0}' is declared more than once")]
    Duplicate(String),

    #[error("Parameter '{param}' of '{operation}' has a {found} default, expected {expected}")]
    InvalidDefault {
        operation: String,
        param: String,
        expected: ParamKind,
        found: &'static str,
    },
}

/// Kind of data an operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    #[default]
    Image,
    Labels,
}

impl OutputKind {
    pub fn is_categorical(self) -> bool {
        matches!(self, OutputKind::Labels)
    }
}

/// Type of a literal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Float,
    Int,
    Bool,
    Str,
}

impl ParamKind {
    /// Whether `value` is acceptable for this kind. Integers are accepted
    /// where floats are expected.
    pub fn accepts(self, value: &ArgValue) -> bool {
        matches!(
            (self, value),
            (ParamKind::Float, ArgValue::Float(_))
                | (ParamKind::Float, ArgValue::Int(_))
                | (ParamKind::Int, ArgValue::Int(_))
                | (ParamKind::Bool, ArgValue::Bool(_))
                | (ParamKind::Str, ArgValue::Str(_))
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Float => "float",
            ParamKind::Int => "int",
            ParamKind::Bool => "bool",
            ParamKind::Str => "str",
        };
        write!(f, "{}", name)
    }
}

/// A literal parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub default: ArgValue,
}

impl ParamSpec {
    pub fn float(name: &str, default: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Float,
            default: ArgValue::Float(default),
        }
    }

    pub fn int(name: &str, default: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Int,
            default: ArgValue::Int(default),
        }
    }

    pub fn bool(name: &str, default: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Bool,
            default: ArgValue::Bool(default),
        }
    }
}

fn default_image_inputs() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Signature of one operation as seen by the code generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_image_inputs")]
    pub image_inputs: usize,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub output: OutputKind,
    /// Whether the call takes a freshly allocated output buffer right after
    /// its image inputs.
    #[serde(default = "default_true")]
    pub output_placeholder: bool,
}

impl OperationSpec {
    pub fn new(name: &str, category: &str, image_inputs: usize) -> Self {
        Self {
            name: name.to_string(),
            category: Some(category.to_string()),
            image_inputs,
            params: Vec::new(),
            output: OutputKind::Image,
            output_placeholder: true,
        }
    }

    pub fn labels(mut self) -> Self {
        self.output = OutputKind::Labels;
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Cut `supplied` down to the declared parameters and fill missing
    /// trailing ones from their defaults.
    pub fn literal_args(&self, supplied: &[ArgValue]) -> Vec<ArgValue> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                supplied
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| param.default.clone())
            })
            .collect()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for param in &self.params {
            if !param.kind.accepts(&param.default) {
                let found = match param.default {
                    ArgValue::Bool(_) => "bool",
                    ArgValue::Int(_) => "int",
                    ArgValue::Float(_) => "float",
                    ArgValue::Str(_) => "str",
                };
                return Err(CatalogError::InvalidDefault {
                    operation: self.name.clone(),
                    param: param.name.clone(),
                    expected: param.kind,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Lookup from operation name to its signature.
pub trait OperationCatalog {
    /// Resolve an operation by the name recorded on a scene node.
    fn resolve(&self, name: &str) -> Option<&OperationSpec>;

    /// Every known operation, in declaration order.
    fn operations(&self) -> Vec<&OperationSpec>;
}

/// Strip the module prefix some hosts record and map the GUI placeholder
/// onto a plain copy.
pub fn normalize_name(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_prefix("cle.").unwrap_or(name);
    if name == PLACEHOLDER_OPERATION {
        "copy"
    } else {
        name
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "operation")]
    operations: Vec<OperationSpec>,
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    operations: Vec<OperationSpec>,
}

impl StaticCatalog {
    /// Build a catalog, rejecting duplicate names and mistyped defaults.
    pub fn new(operations: Vec<OperationSpec>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for op in &operations {
            if !seen.insert(op.name.as_str()) {
                return Err(CatalogError::Duplicate(op.name.clone()));
            }
            op.validate()?;
        }
        Ok(Self { operations })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.operations)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::debug!(
            "Loaded {} operations from {}",
            catalog.operations.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Default operations of the assistant's categories.
    pub fn builtin() -> Self {
        let operations = vec![
            OperationSpec::new("gaussian_blur", "Noise removal", 1)
                .param(ParamSpec::float("sigma_x", 1.0))
                .param(ParamSpec::float("sigma_y", 1.0))
                .param(ParamSpec::float("sigma_z", 0.0)),
            OperationSpec::new("mean_box", "Noise removal", 1)
                .param(ParamSpec::float("radius_x", 1.0))
                .param(ParamSpec::float("radius_y", 1.0))
                .param(ParamSpec::float("radius_z", 0.0)),
            OperationSpec::new("top_hat_box", "Background removal", 1)
                .param(ParamSpec::float("radius_x", 10.0))
                .param(ParamSpec::float("radius_y", 10.0))
                .param(ParamSpec::float("radius_z", 0.0)),
            OperationSpec::new("gamma_correction", "Filter", 1)
                .param(ParamSpec::float("gamma", 1.0)),
            OperationSpec::new("binary_and", "Combine", 2).labels(),
            OperationSpec::new("add_images_weighted", "Combine", 2)
                .param(ParamSpec::float("factor1", 1.0))
                .param(ParamSpec::float("factor2", 1.0)),
            OperationSpec::new("subtract_images", "Combine", 2),
            OperationSpec::new("threshold_otsu", "Binarize", 1).labels(),
            OperationSpec::new("connected_components_labeling_box", "Label", 1).labels(),
            OperationSpec::new("voronoi_otsu_labeling", "Label", 1)
                .labels()
                .param(ParamSpec::float("spot_sigma", 2.0))
                .param(ParamSpec::float("outline_sigma", 2.0)),
            OperationSpec::new("exclude_labels_on_edges", "Label processing", 1).labels(),
            OperationSpec::new("exclude_labels_outside_size_range", "Label processing", 1)
                .labels()
                .param(ParamSpec::float("minimum_size", 2.0))
                .param(ParamSpec::float("maximum_size", 100.0)),
            OperationSpec::new("label_mean_intensity_map", "Label measurements", 2),
            OperationSpec::new("label_pixel_count_map", "Map", 1),
            OperationSpec::new("draw_mesh_between_touching_labels", "Mesh", 1),
            OperationSpec::new("sub_stack", "Transform", 1)
                .param(ParamSpec::int("start_z", 0))
                .param(ParamSpec::int("end_z", 0)),
            OperationSpec::new("maximum_z_projection", "Projection", 1),
            OperationSpec::new("copy", "Transform", 1),
        ];

        Self { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl OperationCatalog for StaticCatalog {
    fn resolve(&self, name: &str) -> Option<&OperationSpec> {
        let name = normalize_name(name);
        self.operations.iter().find(|op| op.name == name)
    }

    fn operations(&self) -> Vec<&OperationSpec> {
        self.operations.iter().collect()
    }
}
