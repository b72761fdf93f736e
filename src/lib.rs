//! # hedvalidator
//!
//! Validation of HED (Hierarchical Event Descriptor) annotation strings
//! against a tag schema.
//!
//! A HED string is a comma-separated sequence of slash-delimited tags such as
//! `Event/Category/Experimental stimulus`, optionally grouped with
//! parentheses and tilde-separated within a group. Validation runs in two
//! tiers:
//!
//! - syntax: delimiters, brackets, illegal characters, tilde bound;
//! - semantics against a schema: tag existence, duplicates, unique and
//!   required prefixes, values and units, plus naming-convention warnings.
//!
//! Issues accumulate; validation never stops at the first problem.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hedvalidator::{SchemaDictionary, TagValidator, ValidatorConfig};
//!
//! let schema = SchemaDictionary::from_file("HED7.1.1.xml")?;
//! let validator = TagValidator::new(Arc::new(schema), ValidatorConfig::default());
//!
//! for issue in validator.validate_hed_string("Event/Label/Hi, Event/Duration/3 cm") {
//!     println!("{}", issue);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub mod issues;
pub mod schema;
pub mod loaders;

pub mod delimiter;
pub mod validators;

pub mod input;
pub mod report;

// Re-exports for convenience
pub use delimiter::{parse_hed_string, HedStringStructure, ParsedHedString};
pub use error::{Error, Result, SchemaLoadError};
pub use issues::{Issue, IssueKind, Severity};
pub use schema::SchemaDictionary;
pub use validators::{TagValidator, ValidatorConfig};

/// Version of the hedvalidator library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
