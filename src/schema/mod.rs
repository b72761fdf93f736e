//! HED schema dictionary
//!
//! The [`SchemaDictionary`] is an arena of [`SchemaNode`]s built once from a
//! [`SchemaDocument`] and never mutated afterwards. Nodes keep the path
//! casing of the document; all lookups go through lowercase indices, so
//! matching is case-insensitive while messages can still quote the schema.
//!
//! Two derived indices sit next to the tree:
//! - every lowercase path → node, for exact matches;
//! - lowercase paths of nodes flagged `takesValue` or `extensionAllowed`,
//!   for longest-prefix matches of tags that end in a value or extension.

pub mod attributes;
mod builder;
pub mod document;
pub mod xml;

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{Result, SchemaLoadError};
use crate::loaders::{Loader, Source};

pub use attributes::{Attribute, NodeAttributes};
pub use document::{SchemaDocument, SchemaNodeSpec, UnitClassSpec};

/// Index of a node in the dictionary arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A node of the tag tree
#[derive(Debug, Clone)]
pub struct SchemaNode {
    id: NodeId,
    name: String,
    path: String,
    parent: Option<NodeId>,
    children: IndexMap<String, NodeId>,
    attributes: NodeAttributes,
}

impl SchemaNode {
    /// Arena id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Path segment name, as written in the schema
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full slash-delimited path, as written in the schema
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parent node id (`None` for top-level categories)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in document order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// Look up a child by segment name (case-insensitive)
    pub fn child(&self, segment: &str) -> Option<NodeId> {
        self.children.get(&segment.to_lowercase()).copied()
    }

    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Attribute set
    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    /// Check a boolean attribute
    pub fn has(&self, attribute: Attribute) -> bool {
        self.attributes.has(attribute)
    }
}

/// A declared unit class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitClass {
    name: String,
    units: IndexSet<String>,
    default_unit: String,
}

impl UnitClass {
    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legal unit tokens, as declared
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }

    /// Default unit
    pub fn default_unit(&self) -> &str {
        &self.default_unit
    }

    /// Check whether a unit token is legal for this class (case-insensitive)
    pub fn contains(&self, unit: &str) -> bool {
        self.units.iter().any(|u| u.eq_ignore_ascii_case(unit))
    }
}

/// Result of a prefix lookup: a schema node matching the leading segments of
/// a path, and whatever follows it
#[derive(Debug, Clone)]
pub struct PrefixMatch<'a> {
    /// The matched node
    pub node: &'a SchemaNode,
    /// Lowercase path of the matched prefix
    pub prefix: String,
    /// Lowercase text after the prefix, without the separating slash
    pub remainder: String,
}

impl PrefixMatch<'_> {
    /// Number of path segments after the prefix
    pub fn remaining_segments(&self) -> usize {
        if self.remainder.is_empty() {
            0
        } else {
            self.remainder.split('/').count()
        }
    }
}

/// Immutable schema tree plus lookup indices
#[derive(Debug, Clone)]
pub struct SchemaDictionary {
    version: Option<String>,
    nodes: Vec<SchemaNode>,
    roots: IndexMap<String, NodeId>,
    by_path: HashMap<String, NodeId>,
    prefix_index: HashMap<String, NodeId>,
    unit_classes: IndexMap<String, UnitClass>,
    required: Vec<NodeId>,
    unique: Vec<NodeId>,
}

impl SchemaDictionary {
    /// Build a dictionary from a parsed schema document
    pub fn build(document: &SchemaDocument) -> std::result::Result<Self, SchemaLoadError> {
        builder::DictionaryBuilder::new().build(document)
    }

    /// Load and build a dictionary from a schema file (XML or JSON)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Loader::new().load_schema(&Source::Path(path.as_ref().to_path_buf()))
    }

    /// Build a dictionary from HED XML text, under the default [`Limits`](crate::limits::Limits)
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let document = Loader::new().parse_xml(xml)?;
        Ok(Self::build(&document)?)
    }

    /// Schema version, if the document declared one
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the dictionary has no nodes (never true for a built dictionary)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Iterate over all nodes in document order
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// Top-level category nodes
    pub fn roots(&self) -> impl Iterator<Item = &SchemaNode> {
        self.roots.values().map(move |id| self.node(*id))
    }

    /// Nodes flagged `required`
    pub fn required_nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.required.iter().map(move |id| self.node(*id))
    }

    /// Nodes flagged `unique`
    pub fn unique_nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.unique.iter().map(move |id| self.node(*id))
    }

    /// Declared unit classes
    pub fn unit_classes(&self) -> impl Iterator<Item = &UnitClass> {
        self.unit_classes.values()
    }

    /// Look up a unit class by name (case-insensitive)
    pub fn unit_class(&self, name: &str) -> Option<&UnitClass> {
        self.unit_classes.get(&name.to_lowercase())
    }

    /// Unit classes attached to a node
    pub fn node_unit_classes<'a>(
        &'a self,
        node: &'a SchemaNode,
    ) -> impl Iterator<Item = &'a UnitClass> + 'a {
        node.attributes
            .unit_classes
            .iter()
            .filter_map(move |name| self.unit_class(name))
    }

    /// All legal unit tokens for a node's value
    pub fn legal_units<'a>(&'a self, node: &'a SchemaNode) -> Vec<&'a str> {
        self.node_unit_classes(node)
            .flat_map(UnitClass::units)
            .collect()
    }

    /// Default unit for a node's value: the node's own `default`, else the
    /// default of its first unit class
    pub fn default_unit<'a>(&'a self, node: &'a SchemaNode) -> Option<&'a str> {
        node.attributes
            .default_unit
            .as_deref()
            .or_else(|| self.node_unit_classes(node).next().map(UnitClass::default_unit))
    }

    /// Case-insensitive exact lookup of a slash-delimited path
    pub fn lookup_exact(&self, formatted_path: &str) -> Option<&SchemaNode> {
        self.by_path
            .get(&formatted_path.to_lowercase())
            .map(|id| self.node(*id))
    }

    /// Deepest node carrying `attribute` whose path is a prefix of `formatted_path`
    ///
    /// Only nodes flagged `takesValue` or `extensionAllowed` are indexed, so
    /// other attributes never match.
    pub fn longest_prefix_with_attribute(
        &self,
        formatted_path: &str,
        attribute: Attribute,
    ) -> Option<PrefixMatch<'_>> {
        let lowered = formatted_path.to_lowercase();
        let found = prefixes(&lowered).find_map(|(prefix, remainder)| {
            self.prefix_index
                .get(prefix)
                .map(|id| self.node(*id))
                .filter(|node| node.has(attribute))
                .map(|node| PrefixMatch {
                    node,
                    prefix: prefix.to_string(),
                    remainder: remainder.to_string(),
                })
        });
        found
    }

    /// Deepest schema node whose path is a prefix of (or equal to) `formatted_path`
    pub fn deepest_match(&self, formatted_path: &str) -> Option<PrefixMatch<'_>> {
        let lowered = formatted_path.to_lowercase();
        let found = prefixes(&lowered).find_map(|(prefix, remainder)| {
            self.by_path.get(prefix).map(|id| PrefixMatch {
                node: self.node(*id),
                prefix: prefix.to_string(),
                remainder: remainder.to_string(),
            })
        });
        found
    }
}

impl fmt::Display for SchemaDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HED schema {} ({} nodes, {} unit classes)",
            self.version.as_deref().unwrap_or("(unversioned)"),
            self.nodes.len(),
            self.unit_classes.len()
        )
    }
}

/// Slash-boundary prefixes of a path, longest first, each with its remainder
fn prefixes(path: &str) -> impl Iterator<Item = (&str, &str)> {
    let full = std::iter::once((path, ""));
    let cuts = path
        .char_indices()
        .rev()
        .filter(|(_, c)| *c == '/')
        .map(move |(i, _)| (&path[..i], &path[i + 1..]));
    full.chain(cuts)
}
