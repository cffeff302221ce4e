//! Pipeline export.
//!
//! A scene snapshot is turned into code in four stages, each a pure function
//! of the previous stage's output:
//!
//! ```text
//! Scene ──► [GraphExtractor] ──► Graph ──► [TopologicalOrderer] ──► Order
//!                                                                    │
//!   Artifact ◄── [CodeGenerator] ◄── Vec<Step> ◄── [StepBuilder] ◄───┘
//! ```
//!
//! [`Pipeline`] runs the first three stages once and renders the resulting
//! steps to any [`GeneratorKind`], optionally writing the artifact to disk
//! and launching a notebook runner on it.
//!
//! # Design
//!
//! - **Snapshot in, text out**: nothing here touches the live scene; all state
//!   is owned by one export and dropped afterwards.
//! - **Insertion-ordered graph**: the graph keeps the order nodes were
//!   discovered in, and the orderer breaks ties by it, so re-exporting an
//!   unchanged scene gives identical output.
//! - **Warnings, not errors**: unknown operations, dangling inputs and failed
//!   notebook runs are reported as [`PipelineWarning`]s; only cycles,
//!   serialization and file writes fail an export.

pub mod error;
pub mod facade;
pub mod generator;
pub mod graph;
pub mod id;
pub mod order;
pub mod persist;
pub mod runner;
pub mod step;

pub use error::{PipelineError, PipelineResult, PipelineWarning};
pub use facade::{generator_for, Pipeline, RenderOptions, Rendered};
pub use generator::{Artifact, CodeGenerator, GeneratorKind};
pub use graph::{Extraction, Graph, GraphEntry, GraphExtractor, Operation};
pub use id::NodeId;
pub use order::TopologicalOrderer;
pub use persist::write_artifact;
pub use runner::{CommandRunner, NotebookRunner};
pub use step::{build_steps, DisplayRange, NamingScheme, Step, StepBuilder};
