//! Error types for property trees and the type registry.

/// Errors raised while building or editing a property tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PropertyError {
    /// Type name was never registered
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// Path string could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Nothing lives at the given path
    #[error("Property not found: {path}")]
    NotFound { path: String },

    /// A non-terminal path segment names a leaf
    #[error("Property '{name}' is not a composite (while resolving '{path}')")]
    NotComposite { name: String, path: String },

    /// Value rejected by the leaf's type or constraint
    #[error("Invalid value for '{name}' of type {type_name}: {value}")]
    InvalidValue {
        name: String,
        type_name: String,
        value: serde_json::Value,
    },

    /// Dictionary used before a schema template was attached
    #[error("Dictionary '{name}' has no schema")]
    MissingSchema { name: String },

    /// Raw child insertion on a dictionary instance
    #[error("Cannot add '{child}' to dictionary '{name}': entries are created from values only")]
    DictionaryInsert { name: String, child: String },

    /// Two children with the same name at one level
    #[error("Duplicate property '{child}' in '{name}'")]
    DuplicateName { name: String, child: String },
}

impl PropertyError {
    pub(crate) fn not_found(path: impl ToString) -> Self {
        PropertyError::NotFound {
            path: path.to_string(),
        }
    }
}

pub type Result<T, E = PropertyError> = std::result::Result<T, E>;
