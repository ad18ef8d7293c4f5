//! Error types for Pantograph operations.
//!
//! This module provides the main error type [`PantographError`] which wraps
//! the error conditions that can occur while editing, loading, or saving a
//! diagram. Component-local error types live with their components
//! ([`ValidationError`](pantograph_core::model::ValidationError) in the core
//! model, [`LoadError`](crate::persist::LoadError) in the persistence
//! adapter); this module ties them together for callers that drive the whole
//! engine.

use std::io;

use thiserror::Error;

use pantograph_core::model::ValidationError;

use crate::persist::LoadError;

/// An editing operation failed.
///
/// Validation failures are rejected before any mutation; command misuse means
/// a command object was driven out of order (undone before execution, or
/// undone twice), which indicates a caller bug and is reported rather than
/// ignored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("command misuse: {0}")]
    CommandMisuse(&'static str),
}

/// The main error type for Pantograph operations.
#[derive(Debug, Error)]
pub enum PantographError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl From<ValidationError> for PantographError {
    fn from(error: ValidationError) -> Self {
        Self::Edit(EditError::Validation(error))
    }
}
