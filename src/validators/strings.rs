//! Whole-string rules: unique and required schema prefixes

use crate::delimiter::HedTag;
use crate::issues::{report_error, report_warning, Issue, IssueFields, IssueKind};
use crate::schema::{SchemaDictionary, SchemaNode};

/// Whether a formatted tag falls under a node's path
fn under(tag: &HedTag, prefix: &str) -> bool {
    let formatted = tag.formatted();
    formatted == prefix
        || (formatted.len() > prefix.len()
            && formatted.starts_with(prefix)
            && formatted.as_bytes()[prefix.len()] == b'/')
}

fn lowercase_path(node: &SchemaNode) -> String {
    node.path().to_lowercase()
}

/// One issue per unique node with more than one tag under it, at any depth
pub fn check_unique(schema: &SchemaDictionary, tags: &[&HedTag]) -> Vec<Issue> {
    schema
        .unique_nodes()
        .filter(|node| {
            let prefix = lowercase_path(node);
            tags.iter().filter(|tag| under(tag, &prefix)).count() > 1
        })
        .map(|node| {
            report_error(
                IssueKind::Unique,
                IssueFields::new().with_tag_prefix(node.path()),
            )
        })
        .collect()
}

/// One warning per required node with no tag under it
pub fn check_required(schema: &SchemaDictionary, tags: &[&HedTag]) -> Vec<Issue> {
    schema
        .required_nodes()
        .filter(|node| {
            let prefix = lowercase_path(node);
            !tags.iter().any(|tag| under(tag, &prefix))
        })
        .map(|node| {
            report_warning(
                IssueKind::Required,
                IssueFields::new().with_tag_prefix(node.path()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::parse_hed_string;
    use crate::schema::{SchemaDocument, SchemaNodeSpec};

    fn schema() -> SchemaDictionary {
        let doc = SchemaDocument::new().with_tag(
            SchemaNodeSpec::new("Event")
                .with_child(
                    SchemaNodeSpec::new("Category")
                        .with_flag("required")
                        .with_child(SchemaNodeSpec::new("Experimental stimulus")),
                )
                .with_child(
                    SchemaNodeSpec::new("Label")
                        .with_flag("unique")
                        .with_child(SchemaNodeSpec::new("#")),
                )
                .with_child(SchemaNodeSpec::new("Labelled")),
        );
        SchemaDictionary::build(&doc).unwrap()
    }

    fn run<F>(input: &str, check: F) -> Vec<Issue>
    where
        F: Fn(&SchemaDictionary, &[&HedTag]) -> Vec<Issue>,
    {
        let parsed = parse_hed_string(input);
        check(&schema(), &parsed.structure.tags())
    }

    #[test]
    fn test_unique_counts_nested_tags() {
        let issues = run("Event/Label/A, (Event/Label/B)", check_unique);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].fields().tag_prefix.as_deref(), Some("Event/Label"));
    }

    #[test]
    fn test_unique_respects_segment_boundary() {
        assert!(run("Event/Label/A, Event/Labelled", check_unique).is_empty());
    }

    #[test]
    fn test_required() {
        let issues = run("Event/Label/A", check_required);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_warning());
        assert_eq!(issues[0].kind(), IssueKind::Required);

        assert!(run("(Event/Category/Experimental stimulus)", check_required).is_empty());
    }
}
