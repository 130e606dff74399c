//! Error types for the binding layer.
//!
//! Every variant describes a programming or configuration mistake. Errors are
//! returned synchronously to the caller and never retried internally.

use std::path::PathBuf;

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;

/// Errors raised by descriptors, schemas, models and mappers.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// A field was accessed before an index was assigned to it, or through a
    /// model whose schema does not contain it.
    #[error("Field '{name}' has no assigned index")]
    IndexUnassigned { name: String },

    /// An indexed operation received a row outside `0..count`.
    #[error("Index {index} is out of range for a model with {count} rows")]
    IndexOutOfRange { index: usize, count: usize },

    /// Two fields in one type hierarchy share a name.
    #[error("Field '{name}' declared by '{second_owner}' collides with the one declared by '{first_owner}'")]
    NameCollision {
        name: String,
        first_owner: &'static str,
        second_owner: &'static str,
    },

    /// One descriptor was registered by two different declaring types.
    #[error("Field '{name}' is declared by '{owner}' and cannot also be declared by '{claimant}'")]
    OwnerConflict {
        name: String,
        owner: &'static str,
        claimant: &'static str,
    },

    /// A stored value did not have the type the typed accessor expected.
    #[error("Field '{name}' holds {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A field name is not part of the schema.
    #[error("Type '{type_name}' has no field named '{name}'")]
    UnknownField { name: String, type_name: String },

    /// A mapping configuration refers to an editor that was not provided.
    #[error("No editor named '{name}'")]
    UnknownEditor { name: String },

    /// A mapping id does not belong to the mapper it was passed to, or was
    /// already removed.
    #[error("Mapping is not registered with this mapper")]
    UnknownMapping,

    /// A mapper operation needs a model but none is set.
    #[error("Mapper has no model")]
    NoModel,

    /// A mapping configuration file could not be read.
    #[error("Failed to read mapping configuration '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A mapping configuration could not be parsed.
    #[error("Invalid mapping configuration: {source}")]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },
}

impl BindingError {
    /// Create an unassigned-index error.
    pub fn unassigned(name: impl Into<String>) -> Self {
        Self::IndexUnassigned { name: name.into() }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Create an unknown-field error.
    pub fn unknown_field(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnknownField {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
