//! Construction of a [`SchemaDictionary`] from a [`SchemaDocument`]

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use super::attributes::NodeAttributes;
use super::document::{SchemaDocument, SchemaNodeSpec, UnitClassSpec};
use super::{NodeId, SchemaDictionary, SchemaNode, UnitClass};
use crate::error::SchemaLoadError;

/// Name of the child node that stands for a user-supplied value
const VALUE_PLACEHOLDER: &str = "#";

/// Accumulates nodes while walking a document
pub(super) struct DictionaryBuilder {
    nodes: Vec<SchemaNode>,
    roots: IndexMap<String, NodeId>,
    by_path: HashMap<String, NodeId>,
    unit_classes: IndexMap<String, UnitClass>,
}

impl DictionaryBuilder {
    pub(super) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: IndexMap::new(),
            by_path: HashMap::new(),
            unit_classes: IndexMap::new(),
        }
    }

    pub(super) fn build(
        mut self,
        document: &SchemaDocument,
    ) -> Result<SchemaDictionary, SchemaLoadError> {
        if document.tags.is_empty() {
            return Err(SchemaLoadError::MissingSection("tags".to_string()));
        }

        for spec in &document.unit_classes {
            self.add_unit_class(spec)?;
        }
        for spec in &document.tags {
            self.add_node(spec, None)?;
        }

        let mut prefix_index = HashMap::new();
        let mut required = Vec::new();
        let mut unique = Vec::new();
        for node in &self.nodes {
            let attrs = &node.attributes;
            if attrs.takes_value || attrs.extension_allowed {
                prefix_index.insert(node.path.to_lowercase(), node.id);
            }
            if attrs.required {
                required.push(node.id);
            }
            if attrs.unique {
                unique.push(node.id);
            }
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            unit_classes = self.unit_classes.len(),
            required = required.len(),
            unique = unique.len(),
            "built schema dictionary"
        );

        Ok(SchemaDictionary {
            version: document.version.clone(),
            nodes: self.nodes,
            roots: self.roots,
            by_path: self.by_path,
            prefix_index,
            unit_classes: self.unit_classes,
            required,
            unique,
        })
    }

    fn add_unit_class(&mut self, spec: &UnitClassSpec) -> Result<(), SchemaLoadError> {
        let name = spec.name.trim();
        if name.is_empty() {
            return Err(SchemaLoadError::MissingAttribute {
                element: "unit class".to_string(),
                attribute: "name".to_string(),
            });
        }

        let units: IndexSet<String> = spec
            .units
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect();
        if units.is_empty() {
            return Err(SchemaLoadError::InvalidUnitClass {
                name: name.to_string(),
                reason: "no units declared".to_string(),
            });
        }

        let default_unit = spec
            .default_unit
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| SchemaLoadError::MissingAttribute {
                element: format!("unit class '{}'", name),
                attribute: "default".to_string(),
            })?;
        if !units.iter().any(|u| u.eq_ignore_ascii_case(default_unit)) {
            return Err(SchemaLoadError::InvalidUnitClass {
                name: name.to_string(),
                reason: format!("default unit '{}' is not one of its units", default_unit),
            });
        }

        let key = name.to_lowercase();
        if self.unit_classes.contains_key(&key) {
            return Err(SchemaLoadError::InvalidUnitClass {
                name: name.to_string(),
                reason: "declared more than once".to_string(),
            });
        }
        self.unit_classes.insert(
            key,
            UnitClass {
                name: name.to_string(),
                units,
                default_unit: default_unit.to_string(),
            },
        );
        Ok(())
    }

    fn add_node(
        &mut self,
        spec: &SchemaNodeSpec,
        parent: Option<NodeId>,
    ) -> Result<(), SchemaLoadError> {
        let parent_path = parent
            .map(|id| self.nodes[id.0].path.clone())
            .unwrap_or_default();
        let name = spec.name.trim();

        if name.is_empty() {
            let element = if parent_path.is_empty() {
                "top-level node".to_string()
            } else {
                format!("node under '{}'", parent_path)
            };
            return Err(SchemaLoadError::MissingAttribute {
                element,
                attribute: "name".to_string(),
            });
        }

        let attributes = self.read_attributes(spec, &parent_path, name)?;

        if name == VALUE_PLACEHOLDER {
            let parent = parent.ok_or(SchemaLoadError::OrphanPlaceholder)?;
            self.nodes[parent.0].attributes.absorb_placeholder(attributes);
            return Ok(());
        }

        if name.contains('/') {
            return Err(SchemaLoadError::InvalidNodeName {
                name: name.to_string(),
                parent: parent_path,
            });
        }

        let path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_path, name)
        };
        let key = name.to_lowercase();
        let siblings = match parent {
            Some(id) => &self.nodes[id.0].children,
            None => &self.roots,
        };
        if siblings.contains_key(&key) {
            return Err(SchemaLoadError::DuplicateNode(path));
        }

        let id = NodeId(self.nodes.len());
        self.by_path.insert(path.to_lowercase(), id);
        self.nodes.push(SchemaNode {
            id,
            name: name.to_string(),
            path,
            parent,
            children: IndexMap::new(),
            attributes,
        });
        match parent {
            Some(parent) => {
                self.nodes[parent.0].children.insert(key, id);
            }
            None => {
                self.roots.insert(key, id);
            }
        }

        for child in &spec.children {
            self.add_node(child, Some(id))?;
        }
        Ok(())
    }

    fn read_attributes(
        &self,
        spec: &SchemaNodeSpec,
        parent_path: &str,
        name: &str,
    ) -> Result<NodeAttributes, SchemaLoadError> {
        let node_path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_path, name)
        };

        let (attributes, ignored) = NodeAttributes::from_raw(&spec.attributes);
        if !ignored.is_empty() {
            tracing::debug!(node = %node_path, ?ignored, "ignoring unknown schema attributes");
        }

        for unit_class in &attributes.unit_classes {
            if !self.unit_classes.contains_key(&unit_class.to_lowercase()) {
                return Err(SchemaLoadError::UnknownUnitClass {
                    node: node_path,
                    unit_class: unit_class.clone(),
                });
            }
        }
        Ok(attributes)
    }
}
