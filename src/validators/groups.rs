//! Group rules: tilde bound and same-level duplicates

use std::collections::HashSet;

use crate::delimiter::{HedTag, TagGroup};
use crate::issues::{report_error, Issue, IssueFields, IssueKind};

/// Most tilde-separated segments a group may have
pub const MAX_TILDE_SEGMENTS: usize = 3;

/// Report a group with too many tilde-separated segments
pub fn check_tilde_bound(group: &TagGroup) -> Option<Issue> {
    (group.tilde_segment_count() > MAX_TILDE_SEGMENTS).then(|| {
        report_error(
            IssueKind::Tilde,
            IssueFields::new().with_tag(group.text()),
        )
    })
}

/// Report every repeat of a formatted tag within one sequence
///
/// Tags in different tilde segments of the same group are not compared.
pub fn check_duplicates<'a>(tags: impl IntoIterator<Item = &'a HedTag>) -> Vec<Issue> {
    let mut seen: HashSet<(usize, &'a str)> = HashSet::new();
    let mut issues = Vec::new();
    for tag in tags {
        if !seen.insert((tag.segment(), tag.formatted())) {
            issues.push(report_error(
                IssueKind::Duplicate,
                IssueFields::new().with_tag(tag.text()),
            ));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::parse_hed_string;

    fn first_group(input: &str) -> TagGroup {
        parse_hed_string(input).structure.groups()[0].clone()
    }

    #[test]
    fn test_tilde_bound() {
        assert!(check_tilde_bound(&first_group("(A ~ B ~ C)")).is_none());
        let issue = check_tilde_bound(&first_group("(A ~ B ~ C ~ D)")).unwrap();
        assert_eq!(issue.kind(), IssueKind::Tilde);
        assert_eq!(issue.tag(), Some("(A ~ B ~ C ~ D)"));
    }

    #[test]
    fn test_duplicates_in_group() {
        let group = first_group("(A/B, a/b, C, A/B)");
        let issues = check_duplicates(group.tags());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].tag(), Some("a/b"));
        assert_eq!(issues[1].tag(), Some("A/B"));
    }

    #[test]
    fn test_tilde_segments_are_separate() {
        let group = first_group("(A ~ A)");
        assert!(check_duplicates(group.tags()).is_empty());
    }

    #[test]
    fn test_nested_levels_are_separate() {
        let parsed = parse_hed_string("A, (A)");
        assert!(check_duplicates(parsed.structure.top_level_tags()).is_empty());
    }
}
