//! Schema node attributes

use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Boolean attributes a schema node may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// The node is invalid as a terminal tag
    RequireChild,
    /// Free-text segments may appear below the node
    ExtensionAllowed,
    /// The segment after the node is a user-supplied value
    TakesValue,
    /// The value must be numeric
    IsNumeric,
    /// Every string must contain a tag under the node
    Required,
    /// At most one tag under the node per string
    Unique,
}

impl Attribute {
    /// Parse an attribute from its schema document name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "requireChild" => Some(Self::RequireChild),
            "extensionAllowed" => Some(Self::ExtensionAllowed),
            "takesValue" => Some(Self::TakesValue),
            "isNumeric" => Some(Self::IsNumeric),
            "required" => Some(Self::Required),
            "unique" => Some(Self::Unique),
            _ => None,
        }
    }

    /// Schema document name of the attribute
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequireChild => "requireChild",
            Self::ExtensionAllowed => "extensionAllowed",
            Self::TakesValue => "takesValue",
            Self::IsNumeric => "isNumeric",
            Self::Required => "required",
            Self::Unique => "unique",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Full attribute set of a schema node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttributes {
    /// requireChild
    pub require_child: bool,
    /// extensionAllowed
    pub extension_allowed: bool,
    /// takesValue
    pub takes_value: bool,
    /// isNumeric
    pub is_numeric: bool,
    /// required
    pub required: bool,
    /// unique
    pub unique: bool,
    /// predicateType (e.g. `propertyOf`, `subclassOf`)
    pub predicate_type: Option<String>,
    /// Names of the unit classes the node's value is measured in
    pub unit_classes: IndexSet<String>,
    /// Node-level default unit, overriding the unit class default
    pub default_unit: Option<String>,
}

impl NodeAttributes {
    /// Read attributes from raw name/value pairs
    ///
    /// Unknown names are skipped and returned so the caller can report them.
    pub fn from_raw(raw: &IndexMap<String, String>) -> (Self, Vec<String>) {
        let mut attributes = Self::default();
        let mut ignored = Vec::new();

        for (name, value) in raw {
            if let Some(flag) = Attribute::parse(name) {
                if is_truthy(value) {
                    attributes.set(flag);
                }
                continue;
            }
            match name.as_str() {
                "predicateType" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        attributes.predicate_type = Some(value.to_string());
                    }
                }
                "default" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        attributes.default_unit = Some(value.to_string());
                    }
                }
                "unitClass" => {
                    attributes.unit_classes.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string),
                    );
                }
                _ => ignored.push(name.clone()),
            }
        }

        (attributes, ignored)
    }

    /// Check a boolean attribute
    pub fn has(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::RequireChild => self.require_child,
            Attribute::ExtensionAllowed => self.extension_allowed,
            Attribute::TakesValue => self.takes_value,
            Attribute::IsNumeric => self.is_numeric,
            Attribute::Required => self.required,
            Attribute::Unique => self.unique,
        }
    }

    /// Set a boolean attribute
    pub fn set(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::RequireChild => self.require_child = true,
            Attribute::ExtensionAllowed => self.extension_allowed = true,
            Attribute::TakesValue => self.takes_value = true,
            Attribute::IsNumeric => self.is_numeric = true,
            Attribute::Required => self.required = true,
            Attribute::Unique => self.unique = true,
        }
    }

    /// Fold the attributes of a `#` value placeholder into this node
    pub fn absorb_placeholder(&mut self, placeholder: NodeAttributes) {
        self.takes_value = true;
        self.is_numeric |= placeholder.is_numeric;
        self.require_child |= placeholder.require_child;
        self.extension_allowed |= placeholder.extension_allowed;
        self.required |= placeholder.required;
        self.unique |= placeholder.unique;
        self.unit_classes.extend(placeholder.unit_classes);
        if placeholder.default_unit.is_some() {
            self.default_unit = placeholder.default_unit;
        }
        if self.predicate_type.is_none() {
            self.predicate_type = placeholder.predicate_type;
        }
    }

    /// Whether the node's value is constrained by unit classes
    pub fn has_unit_classes(&self) -> bool {
        !self.unit_classes.is_empty()
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_attribute_parse() {
        assert_eq!(Attribute::parse("takesValue"), Some(Attribute::TakesValue));
        assert_eq!(Attribute::parse("position"), None);
        assert_eq!(Attribute::RequireChild.to_string(), "requireChild");
    }

    #[test]
    fn test_from_raw() {
        let (attrs, ignored) = NodeAttributes::from_raw(&raw(&[
            ("takesValue", "true"),
            ("isNumeric", "false"),
            ("unitClass", "time, frequency"),
            ("default", "s"),
            ("position", "3"),
        ]));
        assert!(attrs.takes_value);
        assert!(!attrs.is_numeric);
        assert_eq!(attrs.unit_classes.len(), 2);
        assert!(attrs.unit_classes.contains("frequency"));
        assert_eq!(attrs.default_unit.as_deref(), Some("s"));
        assert_eq!(ignored, vec!["position".to_string()]);
    }

    #[test]
    fn test_empty_value_is_true() {
        let (attrs, _) = NodeAttributes::from_raw(&raw(&[("requireChild", "")]));
        assert!(attrs.has(Attribute::RequireChild));
    }

    #[test]
    fn test_absorb_placeholder() {
        let mut parent = NodeAttributes::default();
        let (placeholder, _) = NodeAttributes::from_raw(&raw(&[
            ("isNumeric", "true"),
            ("unitClass", "time"),
        ]));
        parent.absorb_placeholder(placeholder);
        assert!(parent.takes_value);
        assert!(parent.is_numeric);
        assert!(parent.has_unit_classes());
    }
}
