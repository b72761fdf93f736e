//! Schema document loading
//!
//! Reads schema documents from files or memory, enforces [`Limits`], and
//! builds a [`SchemaDictionary`]. A document whose first non-blank character
//! is `{` is read as JSON; anything else is read as HED XML.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::schema::{xml, SchemaDictionary, SchemaDocument};
use std::fs;
use std::path::PathBuf;

/// Where a schema document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A file on disk
    Path(PathBuf),
    /// Document text held in memory
    String(String),
}

impl Source {
    /// Short description for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::String(_) => "<string>".to_string(),
        }
    }
}

/// Schema document loader
#[derive(Debug, Default)]
pub struct Loader {
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits in effect
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a document as text
    pub fn load(&self, source: &Source) -> Result<String> {
        let content = match source {
            Source::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Source::String(s) => s.clone(),
        };
        self.limits.check_schema_size(content.len())?;
        Ok(content)
    }

    /// Load a document without building it
    pub fn load_document(&self, source: &Source) -> Result<SchemaDocument> {
        let content = self.load(source)?;
        if !content.trim_start().starts_with('{') {
            return self.parse_xml(&content);
        }
        let document = serde_json::from_str(&content)?;
        self.check_document(&document)?;
        Ok(document)
    }

    /// Parse HED XML text held in memory
    pub fn parse_xml(&self, content: &str) -> Result<SchemaDocument> {
        self.limits.check_schema_size(content.len())?;
        let document = xml::parse_schema_xml_with_limits(content, &self.limits)?;
        self.check_document(&document)?;
        Ok(document)
    }

    fn check_document(&self, document: &SchemaDocument) -> Result<()> {
        self.limits.check_schema_depth(document.depth())?;
        self.limits.check_schema_nodes(document.node_count())
    }

    /// Load a document and build the dictionary
    pub fn load_schema(&self, source: &Source) -> Result<SchemaDictionary> {
        let document = self.load_document(source)?;
        let dictionary = SchemaDictionary::build(&document)?;
        tracing::debug!(source = %source.describe(), "{}", dictionary);
        Ok(dictionary)
    }
}
