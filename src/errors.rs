//! Error types for properties, builders, handlers and local API assembly.
//!
//! Each concern gets its own enum so callers can match on the failure they
//! care about; [`Error`] wraps them all for code that only needs to report.

use std::path::PathBuf;

use thiserror::Error;

use crate::builder::Capability;
use crate::operation::PropertyKind;

/// Errors raised while wiring values into a
/// [`Properties`](crate::operation::Properties) collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The id is not present in the collection.
    #[error("Property not found: {id}")]
    NotFound { id: String },

    /// `set` was called with a value of the wrong kind.
    #[error("Property {id} expects a {expected} value, got {found}")]
    TypeMismatch {
        id: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
}

/// Errors from builder registration, activation and capability resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// A builder with this name is already registered.
    #[error("Builder already registered: {name}")]
    DuplicateBuilderName { name: String },

    /// Activation referenced a builder that was never registered.
    #[error("Builder not registered: {name}")]
    BuilderNotFound { name: String },

    /// The builder does not declare the requested capability.
    #[error("Builder {builder} does not implement capability {capability}")]
    CapabilityNotSupported {
        builder: String,
        capability: Capability,
    },

    /// The capability is already claimed at an equal or higher priority.
    #[error(
        "Capability {capability} already activated on {current} at priority {current_priority}; \
         {requested} at priority {requested_priority} rejected"
    )]
    CapabilityAlreadyActivated {
        capability: Capability,
        current: String,
        current_priority: i32,
        requested: String,
        requested_priority: i32,
    },

    /// No builder claims the capability.
    #[error("No builder activated for capability {capability}")]
    CapabilityUnresolved { capability: Capability },
}

/// Errors raised by built handlers while doing their work.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The run context was cancelled before or during the call.
    #[error("Operation cancelled")]
    Cancelled,

    /// The handler cannot perform this action.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Required operation configuration was missing or malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying filesystem or stream error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Environment discovery found no project folder. The API is still
    /// usable; unclaimed capabilities fall back to the null builder.
    #[error("No project found.")]
    NoProjectFound,

    /// An activation table could not be read or parsed.
    #[error("Invalid activation config {path}: {message}")]
    ActivationConfig { path: PathBuf, message: String },
}
