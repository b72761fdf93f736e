//! Value and unit checks for value-taking tags

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{SchemaDictionary, SchemaNode};

/// Leading signed decimal number, optional exponent
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid number pattern"));

/// `H:MM` or `HH:MM`
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid clock pattern"));

/// Unit token that marks a clock-time value
const CLOCK_UNIT: &str = "hour:min";

/// Outcome of checking a value against its node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueCheck {
    /// The value is acceptable
    Valid,
    /// A bare number where a unit could have been given
    MissingUnit {
        /// Unit that will be assumed
        default_unit: String,
    },
    /// Not a number with a legal unit
    InvalidUnit,
    /// Not a number
    NotNumeric,
}

/// Check whether `text` is exactly one number
pub fn is_number(text: &str) -> bool {
    NUMBER
        .find(text)
        .map_or(false, |m| m.end() == text.len())
}

/// Split a value into its leading number and the trimmed rest
fn split_number(value: &str) -> Option<(&str, &str)> {
    NUMBER
        .find(value)
        .map(|m| (m.as_str(), value[m.end()..].trim()))
}

/// Parse a clock value into a time of day
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let captures = CLOCK.captures(value)?;
    let hour = captures[1].parse().ok()?;
    let minute = captures[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Check the value of a tag resolved against a value-taking node
pub fn check_value(schema: &SchemaDictionary, node: &SchemaNode, value: &str) -> ValueCheck {
    let value = value.trim();
    let attributes = node.attributes();

    if attributes.has_unit_classes() {
        let units = schema.legal_units(node);
        let is_legal = |unit: &str| units.iter().any(|u| u.eq_ignore_ascii_case(unit));

        if CLOCK.is_match(value) {
            return if is_legal(CLOCK_UNIT) && parse_clock(value).is_some() {
                ValueCheck::Valid
            } else {
                ValueCheck::InvalidUnit
            };
        }

        if let Some((_, unit)) = split_number(value) {
            if unit.is_empty() {
                return match schema.default_unit(node) {
                    Some(default_unit) => ValueCheck::MissingUnit {
                        default_unit: default_unit.to_string(),
                    },
                    None => ValueCheck::Valid,
                };
            }
            return if is_legal(unit) {
                ValueCheck::Valid
            } else {
                ValueCheck::InvalidUnit
            };
        }

        // Units written before the number, e.g. currency symbols
        let prefixed = units.iter().any(|unit| {
            value.len() > unit.len()
                && value.is_char_boundary(unit.len())
                && value[..unit.len()].eq_ignore_ascii_case(unit)
                && is_number(value[unit.len()..].trim())
        });
        return if prefixed {
            ValueCheck::Valid
        } else {
            ValueCheck::InvalidUnit
        };
    }

    if attributes.is_numeric && !is_number(value) {
        return ValueCheck::NotNumeric;
    }
    ValueCheck::Valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaDocument, SchemaNodeSpec, UnitClassSpec};

    fn schema() -> SchemaDictionary {
        let value = |classes: &str| {
            SchemaNodeSpec::new("#")
                .with_flag("isNumeric")
                .with_attribute("unitClass", classes)
        };
        let doc = SchemaDocument::new()
            .with_tag(
                SchemaNodeSpec::new("Attribute")
                    .with_child(SchemaNodeSpec::new("Duration").with_child(value("time")))
                    .with_child(SchemaNodeSpec::new("Price").with_child(value("currency")))
                    .with_child(SchemaNodeSpec::new("Clock").with_child(
                        SchemaNodeSpec::new("#").with_attribute("unitClass", "clockTime"),
                    ))
                    .with_child(
                        SchemaNodeSpec::new("Repetition")
                            .with_child(SchemaNodeSpec::new("#").with_flag("isNumeric")),
                    )
                    .with_child(SchemaNodeSpec::new("Label").with_child(SchemaNodeSpec::new("#"))),
            )
            .with_unit_class(UnitClassSpec::new("time", ["s", "ms"], "s"))
            .with_unit_class(UnitClassSpec::new("currency", ["$", "EUR"], "$"))
            .with_unit_class(UnitClassSpec::new("clockTime", ["hour:min"], "hour:min"));
        SchemaDictionary::build(&doc).unwrap()
    }

    fn check(path: &str, value: &str) -> ValueCheck {
        let schema = schema();
        let node = schema.lookup_exact(path).unwrap();
        check_value(&schema, node, value)
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("20"));
        assert!(is_number("-3.5"));
        assert!(is_number(".5e-3"));
        assert!(is_number("4."));
        assert!(!is_number("4 s"));
        assert!(!is_number(""));
        assert!(!is_number("abc"));
    }

    #[test]
    fn test_number_with_unit() {
        assert_eq!(check("attribute/duration", "3 ms"), ValueCheck::Valid);
        assert_eq!(check("attribute/duration", "3 MS"), ValueCheck::Valid);
        assert_eq!(check("attribute/duration", "3 cm"), ValueCheck::InvalidUnit);
        assert_eq!(check("attribute/duration", "soon"), ValueCheck::InvalidUnit);
    }

    #[test]
    fn test_bare_number_uses_default() {
        assert_eq!(
            check("attribute/duration", "3"),
            ValueCheck::MissingUnit {
                default_unit: "s".to_string()
            }
        );
    }

    #[test]
    fn test_prefix_unit() {
        assert_eq!(check("attribute/price", "$ 3"), ValueCheck::Valid);
        assert_eq!(check("attribute/price", "$3.50"), ValueCheck::Valid);
        assert_eq!(check("attribute/price", "£3"), ValueCheck::InvalidUnit);
    }

    #[test]
    fn test_clock_values() {
        assert_eq!(check("attribute/clock", "8:30"), ValueCheck::Valid);
        assert_eq!(check("attribute/clock", "23:59"), ValueCheck::Valid);
        assert_eq!(check("attribute/clock", "54:54"), ValueCheck::InvalidUnit);
        assert_eq!(check("attribute/duration", "8:30"), ValueCheck::InvalidUnit);
    }

    #[test]
    fn test_numeric_without_units() {
        assert_eq!(check("attribute/repetition", "20"), ValueCheck::Valid);
        assert_eq!(check("attribute/repetition", "twenty"), ValueCheck::NotNumeric);
        assert_eq!(check("attribute/label", "anything goes"), ValueCheck::Valid);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("8:05"), NaiveTime::from_hms_opt(8, 5, 0));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("8:5"), None);
    }
}
