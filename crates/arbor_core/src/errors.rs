//! Error Types
//!
//! This module defines the error type shared by every Arbor crate.
//!
//! # Overview
//!
//! Most scene-graph operations never fail: invalid structural edits
//! (cycle-forming reparents, zero scale) are rejected silently and reported
//! through a `bool` return. [`ArborError`] is reserved for programming-error
//! class failures that must surface immediately:
//! - Malformed mesh buffers
//! - Unknown component type names in the factory registry
//! - Invalid loop configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! use arbor_core::errors::{ArborError, Result};
//!
//! fn build() -> Result<()> {
//!     let mesh = Mesh::new(positions, indices)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Arbor engine.
#[derive(Error, Debug)]
pub enum ArborError {
    // ========================================================================
    // Mesh Data Errors
    // ========================================================================
    /// Triangle index buffer length is not a multiple of three.
    #[error("Index buffer length {count} is not a multiple of 3")]
    IndexCountMismatch {
        /// Length of the offending index buffer
        count: usize,
    },

    /// A triangle index points past the end of the vertex buffer.
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The invalid index
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// A per-vertex attribute does not match the position count.
    #[error("Attribute `{attribute}` has {actual} elements, expected {expected}")]
    AttributeLengthMismatch {
        /// Attribute name (`normals`, `uvs`, ...)
        attribute: &'static str,
        /// Number of positions
        expected: usize,
        /// Number of attribute elements supplied
        actual: usize,
    },

    // ========================================================================
    // Component Errors
    // ========================================================================
    /// No factory is registered under the requested component name.
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    /// The node handle is stale or was never issued by this scene.
    #[error("Node not found")]
    NodeNotFound,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A settings value is outside its valid range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Alias for `Result<T, ArborError>`.
pub type Result<T> = std::result::Result<T, ArborError>;
