//! Error types for hedvalidator
//!
//! Malformed annotation strings never produce an [`Error`]; they produce
//! [`Issue`](crate::issues::Issue)s. The types here are reserved for the
//! fatal, one-time conditions around loading a schema document.

use thiserror::Error;

/// Result type alias using hedvalidator Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hedvalidator operations
#[derive(Error, Debug)]
pub enum Error {
    /// The schema document is structurally incomplete
    #[error("schema load error: {0}")]
    SchemaLoad(#[from] SchemaLoadError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A schema document that cannot be turned into a [`SchemaDictionary`](crate::schema::SchemaDictionary)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaLoadError {
    /// A required section of the document is absent or empty
    #[error("missing required section '{0}'")]
    MissingSection(String),

    /// A required attribute or child element is absent
    #[error("{element} is missing required '{attribute}'")]
    MissingAttribute {
        /// Description of the element lacking the attribute
        element: String,
        /// Name of the missing attribute
        attribute: String,
    },

    /// A node name is not a legal path segment
    #[error("invalid node name '{name}' under '{parent}'")]
    InvalidNodeName {
        /// The offending name
        name: String,
        /// Path of the parent node (empty for top-level nodes)
        parent: String,
    },

    /// Two sibling nodes share a name (case-insensitively)
    #[error("duplicate node '{0}'")]
    DuplicateNode(String),

    /// A node references a unit class that was never declared
    #[error("node '{node}' references undeclared unit class '{unit_class}'")]
    UnknownUnitClass {
        /// Path of the referencing node
        node: String,
        /// The undeclared unit class name
        unit_class: String,
    },

    /// A unit class is declared inconsistently
    #[error("invalid unit class '{name}': {reason}")]
    InvalidUnitClass {
        /// Unit class name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A `#` value placeholder appears at the top level
    #[error("value placeholder '#' has no parent node")]
    OrphanPlaceholder,
}
