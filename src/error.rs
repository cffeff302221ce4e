//! Error handling for cle-assistant
//!
//! This module defines the crate-level error type and a Result alias.
//! Pipeline and catalog errors keep their own enums and convert into
//! [`AssistantError`] at the crate boundary.

use crate::catalog::CatalogError;
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for cle-assistant operations
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Errors raised while extracting, ordering or rendering a pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to the operation catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Errors related to reading a scene snapshot
    #[error("Scene error: {0}")]
    Scene(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AssistantError>,
    },
}

impl AssistantError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AssistantError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for cle-assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AssistantError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
