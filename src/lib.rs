//! # cle-assistant: pipeline export for GPU image processing
//!
//! Turns a snapshot of an interactive image-processing session (layers, each
//! optionally produced by an operation applied to other layers) into
//! reproducible code: a plain script, a notebook, a percent-format script, a
//! script for the viewer's own editor, or a workflow file.
//!
//! ## Architecture
//!
//! - **Scene**: read-only snapshot of the viewer's layers, handed over by an
//!   adapter (or loaded from JSON by the CLI)
//! - **Catalog**: known operations with their input arity, parameters and
//!   output kind
//! - **Pipeline**: graph extraction, topological ordering, step building and
//!   code generation
//! - **Config**: export preferences and generator identity, persisted as JSON
//!
//! ## Configuration
//!
//! Settings are stored in the platform-appropriate config directory under
//! `cle-assistant/config.json`:
//!
//! - **Linux**: `~/.config/cle-assistant/`
//! - **macOS**: `~/Library/Application Support/cle-assistant/`
//! - **Windows**: `%APPDATA%\cle-assistant\`
//!
//! ## Example
//!
//! ```ignore
//! use cle_assistant::{GeneratorKind, Pipeline, Scene};
//!
//! let scene = Scene::load("session.json")?;
//! let pipeline = Pipeline::from_scene(&scene)?;
//! let rendered = pipeline.render(GeneratorKind::Notebook, Some("analysis".as_ref()))?;
//! for warning in &rendered.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scene;

// Re-export commonly used types
pub use catalog::{OperationCatalog, OperationSpec, StaticCatalog};
pub use config::AppConfig;
pub use error::{AssistantError, Result, ResultExt};
pub use pipeline::{
    Artifact, GeneratorKind, NamingScheme, Pipeline, PipelineError, PipelineWarning,
    RenderOptions, Rendered, Step,
};
pub use scene::{Scene, SceneNode};
