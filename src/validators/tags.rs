//! Per-tag rules

use crate::delimiter::HedTag;
use crate::issues::{report_error, report_warning, Issue, IssueFields, IssueKind};
use crate::schema::{Attribute, SchemaDictionary, SchemaNode};

use super::config::ValidatorConfig;
use super::units::{check_value, ValueCheck};

/// How a tag matched the schema
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// The whole path is a schema node
    Exact(&'a SchemaNode),
    /// A value-taking node followed by one value segment
    Value {
        /// The value-taking node
        node: &'a SchemaNode,
        /// The value as written
        value: String,
    },
    /// Free-text segments below an extensible node
    Extension(&'a SchemaNode),
    /// No match
    Invalid,
}

impl Resolution<'_> {
    /// Whether the tag matched the schema in any way
    pub fn is_valid(&self) -> bool {
        !matches!(self, Resolution::Invalid)
    }

    /// Whether the tag ended in a value
    pub fn is_value(&self) -> bool {
        matches!(self, Resolution::Value { .. })
    }
}

/// Resolve a tag against the schema
///
/// Tried in order: exact node, value-taking prefix with a single trailing
/// segment, extensible prefix. A path that runs past a leaf which does not
/// allow extension is invalid even when an ancestor does.
pub fn resolve<'a>(schema: &'a SchemaDictionary, tag: &HedTag) -> Resolution<'a> {
    let formatted = tag.formatted();
    if formatted.is_empty() {
        return Resolution::Invalid;
    }
    if let Some(node) = schema.lookup_exact(formatted) {
        return Resolution::Exact(node);
    }

    if let Some(found) = schema.longest_prefix_with_attribute(formatted, Attribute::TakesValue) {
        if found.remaining_segments() == 1 {
            let value = tag
                .path()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            return Resolution::Value {
                node: found.node,
                value,
            };
        }
    }

    if let Some(found) = schema.longest_prefix_with_attribute(formatted, Attribute::ExtensionAllowed)
    {
        let blocked = schema.deepest_match(formatted).map_or(false, |deepest| {
            deepest.node.is_leaf() && !deepest.node.has(Attribute::ExtensionAllowed)
        });
        if !blocked {
            return Resolution::Extension(found.node);
        }
    }

    Resolution::Invalid
}

/// Run every per-tag rule on one tag
///
/// `previous` is the resolution of the tag immediately before this one in
/// the same sequence, if that sibling was a tag.
pub fn check_tag(
    schema: &SchemaDictionary,
    config: &ValidatorConfig,
    tag: &HedTag,
    resolution: &Resolution<'_>,
    previous: Option<(&HedTag, &Resolution<'_>)>,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if config.run_semantic_validation {
        match resolution {
            Resolution::Invalid => issues.push(invalid_tag(tag, previous)),
            Resolution::Exact(node) => {
                if node.has(Attribute::RequireChild) {
                    issues.push(report_error(
                        IssueKind::RequireChild,
                        IssueFields::new().with_tag(tag.text()),
                    ));
                }
            }
            Resolution::Value { node, value } => {
                if let Some(issue) = value_issue(schema, config, tag, node, value) {
                    issues.push(issue);
                }
            }
            Resolution::Extension(_) => {}
        }
    }

    if config.check_for_warnings && !is_capitalized(tag, resolution) {
        issues.push(report_warning(
            IssueKind::Cap,
            IssueFields::new().with_tag(tag.text()),
        ));
    }
    issues
}

/// An unresolvable tag right after a value tag is most likely a value that
/// itself contained a comma
fn invalid_tag(tag: &HedTag, previous: Option<(&HedTag, &Resolution<'_>)>) -> Issue {
    match previous {
        Some((previous, resolution)) if resolution.is_value() => report_error(
            IssueKind::Comma,
            IssueFields::new()
                .with_previous_tag(previous.text())
                .with_tag(tag.text()),
        ),
        _ => report_error(IssueKind::Valid, IssueFields::new().with_tag(tag.text())),
    }
}

fn value_issue(
    schema: &SchemaDictionary,
    config: &ValidatorConfig,
    tag: &HedTag,
    node: &SchemaNode,
    value: &str,
) -> Option<Issue> {
    let fields = IssueFields::new().with_tag(tag.text());
    match check_value(schema, node, value) {
        ValueCheck::Valid => None,
        ValueCheck::InvalidUnit => Some(report_error(IssueKind::Unit, fields)),
        ValueCheck::NotNumeric => Some(report_error(IssueKind::IsNumeric, fields)),
        ValueCheck::MissingUnit { default_unit } => config.semantic_warnings().then(|| {
            report_warning(IssueKind::UnitClass, fields.with_default_unit(default_unit))
        }),
    }
}

/// Every path segment after the first starts with an uppercase letter or a
/// non-letter; the value segment of a value tag is exempt
pub fn is_capitalized(tag: &HedTag, resolution: &Resolution<'_>) -> bool {
    let segments: Vec<&str> = tag.segments().collect();
    let checked = if resolution.is_value() {
        segments.len().saturating_sub(1)
    } else {
        segments.len()
    };
    segments
        .iter()
        .take(checked)
        .skip(1)
        .all(|segment| !segment.trim_start().starts_with(char::is_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::parse_hed_string;
    use crate::schema::{SchemaDocument, SchemaNodeSpec, UnitClassSpec};

    fn schema() -> SchemaDictionary {
        let doc = SchemaDocument::new()
            .with_tag(
                SchemaNodeSpec::new("Event")
                    .with_child(
                        SchemaNodeSpec::new("Category")
                            .with_flag("requireChild")
                            .with_child(SchemaNodeSpec::new("Experimental stimulus")),
                    )
                    .with_child(
                        SchemaNodeSpec::new("Label").with_child(SchemaNodeSpec::new("#")),
                    )
                    .with_child(SchemaNodeSpec::new("Duration").with_child(
                        SchemaNodeSpec::new("#")
                            .with_flag("isNumeric")
                            .with_attribute("unitClass", "time"),
                    )),
            )
            .with_tag(
                SchemaNodeSpec::new("Item").with_child(
                    SchemaNodeSpec::new("Object")
                        .with_flag("extensionAllowed")
                        .with_child(
                            SchemaNodeSpec::new("Person")
                                .with_child(SchemaNodeSpec::new("Pedestrian")),
                        ),
                ),
            )
            .with_unit_class(UnitClassSpec::new("time", ["s", "ms"], "s"));
        SchemaDictionary::build(&doc).unwrap()
    }

    fn tag(text: &str) -> HedTag {
        parse_hed_string(text).structure.tags()[0].clone()
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(Issue::kind).collect()
    }

    #[test]
    fn test_resolve_exact_and_value() {
        let schema = schema();
        assert!(matches!(
            resolve(&schema, &tag("event/category")),
            Resolution::Exact(node) if node.path() == "Event/Category"
        ));
        match resolve(&schema, &tag("Event/Label/Hello There")) {
            Resolution::Value { node, value } => {
                assert_eq!(node.path(), "Event/Label");
                assert_eq!(value, "Hello There");
            }
            other => panic!("unexpected resolution {:?}", other),
        }
    }

    #[test]
    fn test_resolve_extension() {
        let schema = schema();
        assert!(matches!(
            resolve(&schema, &tag("Item/Object/Person/Driver")),
            Resolution::Extension(node) if node.path() == "Item/Object"
        ));
        assert!(matches!(
            resolve(&schema, &tag("Item/Object/Person/Pedestrian/Child")),
            Resolution::Invalid
        ));
    }

    #[test]
    fn test_resolve_invalid() {
        let schema = schema();
        assert!(!resolve(&schema, &tag("Event/Nothing")).is_valid());
        assert!(!resolve(&schema, &tag("Event/Label/a/b")).is_valid());
        assert!(!resolve(&schema, &tag("\"\"")).is_valid());
    }

    #[test]
    fn test_require_child() {
        let schema = schema();
        let config = ValidatorConfig::default();
        let t = tag("Event/Category");
        let issues = check_tag(&schema, &config, &t, &resolve(&schema, &t), None);
        assert_eq!(kinds(&issues), vec![IssueKind::RequireChild]);
    }

    #[test]
    fn test_comma_after_value() {
        let schema = schema();
        let config = ValidatorConfig::default();
        let previous = tag("Event/Label/This is a label");
        let previous_resolution = resolve(&schema, &previous);
        let t = tag("This/Is/A/Tag");
        let issues = check_tag(
            &schema,
            &config,
            &t,
            &resolve(&schema, &t),
            Some((&previous, &previous_resolution)),
        );
        assert_eq!(kinds(&issues), vec![IssueKind::Comma]);
        assert_eq!(issues[0].tag(), Some("This/Is/A/Tag"));
    }

    #[test]
    fn test_units() {
        let schema = schema();
        let config = ValidatorConfig::default().with_warnings(true);
        let check = |text: &str| {
            let t = tag(text);
            kinds(&check_tag(&schema, &config, &t, &resolve(&schema, &t), None))
        };
        assert_eq!(check("Event/Duration/3 ms"), Vec::<IssueKind>::new());
        assert_eq!(check("Event/Duration/3 cm"), vec![IssueKind::Unit]);
        assert_eq!(check("Event/Duration/3"), vec![IssueKind::UnitClass]);
    }

    #[test]
    fn test_capitalization() {
        let schema = schema();
        let cap = |text: &str| {
            let t = tag(text);
            is_capitalized(&t, &resolve(&schema, &t))
        };
        assert!(cap("Event/Label/lowercase value"));
        assert!(cap("event/Label"));
        assert!(cap("Item/Object/3D thing"));
        assert!(!cap("Event/something"));
        assert!(!cap("Item/Object/person"));
    }

    #[test]
    fn test_semantics_off_keeps_cap_only() {
        let schema = schema();
        let config = ValidatorConfig::default()
            .with_warnings(true)
            .with_semantic_validation(false);
        let t = tag("Event/nothing");
        let issues = check_tag(&schema, &config, &t, &resolve(&schema, &t), None);
        assert_eq!(kinds(&issues), vec![IssueKind::Cap]);
    }
}
