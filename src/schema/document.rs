//! Schema documents
//!
//! A [`SchemaDocument`] is the already-parsed form of a schema file: a tree
//! of named nodes with raw attribute strings plus the global unit class
//! declarations. It is the input to [`SchemaDictionary::build`](super::SchemaDictionary::build)
//! and can be produced by [`parse_schema_xml`](super::xml::parse_schema_xml),
//! deserialized from JSON, or assembled in code.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A whole schema document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    /// Schema version string
    #[serde(default)]
    pub version: Option<String>,
    /// Top-level tag nodes
    #[serde(default)]
    pub tags: Vec<SchemaNodeSpec>,
    /// Unit class declarations
    #[serde(default)]
    pub unit_classes: Vec<UnitClassSpec>,
}

impl SchemaDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a top-level node
    pub fn with_tag(mut self, node: SchemaNodeSpec) -> Self {
        self.tags.push(node);
        self
    }

    /// Add a unit class
    pub fn with_unit_class(mut self, unit_class: UnitClassSpec) -> Self {
        self.unit_classes.push(unit_class);
        self
    }

    /// Total number of nodes in the tag tree
    pub fn node_count(&self) -> usize {
        self.tags.iter().map(SchemaNodeSpec::node_count).sum()
    }

    /// Maximum nesting depth of the tag tree (top-level nodes have depth 1)
    pub fn depth(&self) -> usize {
        self.tags.iter().map(SchemaNodeSpec::depth).max().unwrap_or(0)
    }
}

/// One node of the tag tree, as written in the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNodeSpec {
    /// Path segment name (`#` marks a value placeholder)
    #[serde(default)]
    pub name: String,
    /// Raw attribute name/value pairs
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<SchemaNodeSpec>,
}

impl SchemaNodeSpec {
    /// Create a node with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Add a raw attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a boolean attribute set to `true`
    pub fn with_flag(self, name: impl Into<String>) -> Self {
        self.with_attribute(name, "true")
    }

    /// Add a child node
    pub fn with_child(mut self, child: SchemaNodeSpec) -> Self {
        self.children.push(child);
        self
    }

    fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// A unit class declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitClassSpec {
    /// Class name (e.g. `time`)
    #[serde(default)]
    pub name: String,
    /// Legal unit tokens
    #[serde(default)]
    pub units: Vec<String>,
    /// Default unit
    #[serde(default, rename = "default")]
    pub default_unit: Option<String>,
}

impl UnitClassSpec {
    /// Create a unit class
    pub fn new<I, S>(name: impl Into<String>, units: I, default_unit: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            units: units.into_iter().map(Into::into).collect(),
            default_unit: Some(default_unit.into()),
        }
    }
}
