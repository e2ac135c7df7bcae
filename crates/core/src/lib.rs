//! Core shared types and errors (renderer-agnostic).
//!
//! Each stage of the asset core reports its own failure type so a host can
//! tell identity, ordering and geometry failures apart and keep processing the
//! remaining assets.

use std::io;

use thiserror::Error;

/// Failure to derive an identity from a path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Path '{path}' is not inside root directory '{root}'")]
    PathOutsideRoot { path: String, root: String },
}

/// Failure to compute a numeric ordering key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// The digits of `name` do not fit into a `u64`.
    #[error("Digits in '{name}' overflow the 64-bit ordering key")]
    DigitOverflow { name: String },
}

/// Failure while parsing a geometry asset. No partial model is ever returned
/// alongside one of these.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Model did not contain at least one object")]
    EmptyModel,

    #[error("Not enough vertices to create a vertex buffer (found {vertices})")]
    InsufficientGeometry { vertices: usize },

    #[error("Malformed face reference '{reference}' on line {line}: {reason}")]
    MalformedFace {
        line: usize,
        reference: String,
        reason: String,
    },

    #[error("Invalid number '{token}' on line {line}")]
    InvalidNumber { line: usize, token: String },

    #[error("Failed to read geometry: {0}")]
    Io(#[from] io::Error),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
