//! # Error Types
//!
//! Structured error types for hydro_core. Each engine has its own error enum so
//! callers can match on exactly what an operation can fail with:
//!
//! - [`NetworkError`] - Connection Manager and Propagation Engine
//! - [`DesignError`] - Stilling basin design and element validation
//! - [`HydroError`] - Umbrella type for project-level operations (file I/O,
//!   combined network + design operations)
//!
//! All errors serialize to JSON (`{"type": ..., "details": {...}}`) so a
//! front-end can surface them without string parsing.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::errors::{DesignError, DesignResult};
//!
//! fn validate_width(width: f64) -> DesignResult<()> {
//!     if width <= 0.0 {
//!         return Err(DesignError::invalid_input(
//!             "width",
//!             width.to_string(),
//!             "Width must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::ElementId;

/// Result type alias for Connection Manager and propagation operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Result type alias for design operations
pub type DesignResult<T> = Result<T, DesignError>;

/// Result type alias for project-level operations
pub type HydroResult<T> = Result<T, HydroError>;

/// Errors raised while editing the element chain.
///
/// Every variant leaves the store unmodified.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum NetworkError {
    /// A link operation would create a cycle, a self-loop, or references a missing element
    #[error("Invalid connection {upstream} -> {downstream}: {reason}")]
    InvalidConnection {
        upstream: ElementId,
        downstream: ElementId,
        reason: String,
    },

    /// The referenced element does not exist in the store
    #[error("Element not found: {id}")]
    ElementNotFound { id: ElementId },

    /// Operation requires a chute but the element is another kind
    #[error("Element {id} is a {kind}, not a chute")]
    NotAChute { id: ElementId, kind: String },

    /// Link symmetry is broken (only reachable through hand-edited files)
    #[error("Broken link on {id}: {reason}")]
    BrokenLink { id: ElementId, reason: String },
}

impl NetworkError {
    /// Create an InvalidConnection error
    pub fn invalid_connection(upstream: ElementId, downstream: ElementId, reason: impl Into<String>) -> Self {
        NetworkError::InvalidConnection {
            upstream,
            downstream,
            reason: reason.into(),
        }
    }

    /// Create an ElementNotFound error
    pub fn not_found(id: ElementId) -> Self {
        NetworkError::ElementNotFound { id }
    }

    /// Create a BrokenLink error
    pub fn broken_link(id: ElementId, reason: impl Into<String>) -> Self {
        NetworkError::BrokenLink {
            id,
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::InvalidConnection { .. } => "INVALID_CONNECTION",
            NetworkError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            NetworkError::NotAChute { .. } => "NOT_A_CHUTE",
            NetworkError::BrokenLink { .. } => "BROKEN_LINK",
        }
    }
}

/// Errors raised by the design engine and element validation.
///
/// No partial result is ever returned alongside one of these.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DesignError {
    /// An input value is invalid (non-positive, non-finite, out of range)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },
}

impl DesignError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        DesignError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DesignError::InvalidInput { .. } => "INVALID_INPUT",
        }
    }
}

/// Umbrella error for project-level operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum HydroError {
    /// Element chain error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Design or validation error
    #[error(transparent)]
    Design(#[from] DesignError),

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl HydroError {
    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        HydroError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        HydroError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        HydroError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HydroError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HydroError::Network(e) => e.error_code(),
            HydroError::Design(e) => e.error_code(),
            HydroError::FileError { .. } => "FILE_ERROR",
            HydroError::FileLocked { .. } => "FILE_LOCKED",
            HydroError::SerializationError { .. } => "SERIALIZATION_ERROR",
            HydroError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
