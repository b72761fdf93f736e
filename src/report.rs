//! Plain-text issue reports

use crate::input::RowIssues;
use crate::issues::Issue;

/// One message per line
pub fn format_issues(issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        out.push_str(issue.message());
        out.push('\n');
    }
    out
}

/// Messages grouped under a `Row N:` header, one row per block
pub fn format_row_issues(rows: &[RowIssues]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!("Row {}:\n", row.row));
        for issue in &row.issues {
            out.push('\t');
            out.push_str(issue.message());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{report_error, report_warning, IssueFields, IssueKind};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Issue> {
        vec![
            report_error(IssueKind::Valid, IssueFields::new().with_tag("Event/Nope")),
            report_warning(IssueKind::Cap, IssueFields::new().with_tag("Event/nope")),
        ]
    }

    #[test]
    fn test_format_issues() {
        assert_eq!(
            format_issues(&sample()),
            "ERROR: Invalid HED tag - \"Event/Nope\"\n\
             WARNING: First word not capitalized or camel case - \"Event/nope\"\n"
        );
    }

    #[test]
    fn test_format_row_issues() {
        let rows = vec![RowIssues {
            row: 3,
            issues: sample()[..1].to_vec(),
        }];
        assert_eq!(
            format_row_issues(&rows),
            "Row 3:\n\tERROR: Invalid HED tag - \"Event/Nope\"\n"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_issues(&[]), "");
        assert_eq!(format_row_issues(&[]), "");
    }
}
