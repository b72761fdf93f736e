//! HED XML schema reader
//!
//! Reads markup of the form
//!
//! ```xml
//! <HED version="7.1.1">
//!   <node><name>Event</name>
//!     <node requireChild="true"><name>Category</name></node>
//!     <node><name>Duration</name>
//!       <node isNumeric="true" unitClass="time"><name>#</name></node>
//!     </node>
//!   </node>
//!   <unitClasses>
//!     <unitClass><name>time</name><units default="s">s,ms</units></unitClass>
//!   </unitClasses>
//! </HED>
//! ```
//!
//! into a [`SchemaDocument`]. Node attributes may also be written as
//! `<attribute><name>..</name><value>..</value></attribute>` children.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use indexmap::IndexMap;

use super::document::{SchemaDocument, SchemaNodeSpec, UnitClassSpec};
use crate::error::{Error, Result, SchemaLoadError};
use crate::limits::Limits;

const ROOT: &str = "HED";

/// Elements that may wrap the deepest tag node: the root, the node's
/// `<attribute>` and that attribute's `<value>`
const WRAPPER_DEPTH: usize = 3;

/// Minimal element tree, enough to walk a schema document
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

/// Parse HED XML text into a schema document under the default limits
pub fn parse_schema_xml(xml: &str) -> Result<SchemaDocument> {
    parse_schema_xml_with_limits(xml, &Limits::default())
}

/// Parse HED XML text into a schema document
///
/// Element nesting is bounded by `limits.max_schema_depth` while reading, so
/// an overly deep document fails with [`Error::LimitExceeded`] before any
/// tree is built.
pub fn parse_schema_xml_with_limits(xml: &str, limits: &Limits) -> Result<SchemaDocument> {
    let root = read_tree(xml, limits)?
        .filter(|root| root.name == ROOT)
        .ok_or_else(|| SchemaLoadError::MissingSection(ROOT.to_string()))?;

    let mut document = SchemaDocument::new();
    document.version = root
        .attribute("version")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    for node in root.children_named("node") {
        document.tags.push(read_node(node));
    }
    if let Some(section) = root.child("unitClasses") {
        for unit_class in section.children_named("unitClass") {
            document.unit_classes.push(read_unit_class(unit_class));
        }
    }

    tracing::debug!(
        version = document.version.as_deref().unwrap_or("-"),
        top_level = document.tags.len(),
        unit_classes = document.unit_classes.len(),
        "read HED XML schema"
    );
    Ok(document)
}

fn read_node(element: &Element) -> SchemaNodeSpec {
    let mut spec = SchemaNodeSpec::new(element.child_text("name").unwrap_or_default());
    spec.attributes = element.attributes.clone();

    for attribute in element.children_named("attribute") {
        if let Some(name) = attribute.child_text("name").filter(|n| !n.is_empty()) {
            let value = attribute.child_text("value").unwrap_or_default();
            spec.attributes.insert(name.to_string(), value.to_string());
        }
    }
    for child in element.children_named("node") {
        spec.children.push(read_node(child));
    }
    spec
}

fn read_unit_class(element: &Element) -> UnitClassSpec {
    let units_element = element.child("units");
    let default_unit = element
        .attribute("default")
        .or_else(|| units_element.and_then(|u| u.attribute("default")))
        .map(str::to_string);

    let mut units = Vec::new();
    if let Some(list) = units_element {
        let nested: Vec<&Element> = list.children_named("unit").collect();
        if nested.is_empty() {
            units.extend(
                list.text
                    .split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string),
            );
        } else {
            for unit in nested {
                let token = unit.child_text("name").unwrap_or(unit.text.trim());
                if !token.is_empty() {
                    units.push(token.to_string());
                }
            }
        }
    }

    UnitClassSpec {
        name: element.child_text("name").unwrap_or_default().to_string(),
        units,
        default_unit,
    }
}

/// Read the document into an element tree, returning the root element
fn read_tree(xml: &str, limits: &Limits) -> Result<Option<Element>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut root = None;
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                limits.check_schema_depth((stack.len() + 1).saturating_sub(WRAPPER_DEPTH))?;
                stack.push(read_element(&e)?);
            }
            Ok(Event::End(_)) => {
                if let Some(current) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(current),
                        None => root = Some(current),
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let element = read_element(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "Error parsing XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Xml(format!(
            "Unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    Ok(root)
}

fn read_element(start: &BytesStart) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
        .to_string();

    let mut element = Element {
        name,
        ..Element::default()
    };
    for attr_result in start.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
            .to_string();
        element.attributes.insert(key, value);
    }
    Ok(element)
}
