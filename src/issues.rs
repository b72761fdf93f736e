//! Validation issues
//!
//! Every problem found in an annotation string is reported as an [`Issue`]:
//! a kind, a severity, the named fields the kind declares, and a message
//! rendered from the kind's fixed template.
//!
//! Issues are built with [`report_error`] and [`report_warning`]. The field set
//! of each kind is part of the public contract; passing a field a kind does
//! not declare (or leaving out one it does) is a bug in the caller and panics
//! immediately instead of producing a half-rendered message.

use serde::Serialize;
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The string is invalid
    Error,
    /// The string is valid but questionable
    Warning,
}

impl Severity {
    /// Message prefix for this severity
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Named fields an issue may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Original-cased tag or group text
    Tag,
    /// Original-cased tag preceding `Tag`
    PreviousTag,
    /// Offending character
    Character,
    /// 0-based character index into the raw string
    Index,
    /// Number of `(` in the string
    OpeningBracketCount,
    /// Number of `)` in the string
    ClosingBracketCount,
    /// Original-cased schema path prefix
    TagPrefix,
    /// Default unit of a unit class
    DefaultUnit,
}

impl Field {
    /// Every field, in declaration order
    pub const ALL: [Field; 8] = [
        Field::Tag,
        Field::PreviousTag,
        Field::Character,
        Field::Index,
        Field::OpeningBracketCount,
        Field::ClosingBracketCount,
        Field::TagPrefix,
        Field::DefaultUnit,
    ];

    /// Field name as used in serialized output
    pub fn name(&self) -> &'static str {
        match self {
            Field::Tag => "tag",
            Field::PreviousTag => "previous_tag",
            Field::Character => "character",
            Field::Index => "index",
            Field::OpeningBracketCount => "opening_bracket_count",
            Field::ClosingBracketCount => "closing_bracket_count",
            Field::TagPrefix => "tag_prefix",
            Field::DefaultUnit => "default_unit",
        }
    }
}

/// Kind of issue
///
/// Serialized as the stable code string returned by [`IssueKind::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// Unequal numbers of opening and closing parentheses
    Bracket,
    /// Illegal character (`{`, `}`, `[`, `]`)
    Character,
    /// Delimiter with no tag on one side
    ExtraDelimiter,
    /// Two items with no delimiter between them
    CommaMissing,
    /// Tag not found in the schema
    Valid,
    /// Invalid tag following a value-taking tag; the value probably contained a comma
    Comma,
    /// Group with more than three tilde-separated segments
    Tilde,
    /// Same tag repeated at one nesting level
    Duplicate,
    /// Unique tag class used more than once
    Unique,
    /// Tag that requires a child used as a terminal tag
    RequireChild,
    /// Value with an illegal unit
    Unit,
    /// Non-numeric value for a numeric tag
    IsNumeric,
    /// Path segment not capitalized
    Cap,
    /// Value without a unit; the default unit applies
    UnitClass,
    /// Required tag class absent from the string
    Required,
}

impl IssueKind {
    /// Stable code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::Bracket => "bracket",
            IssueKind::Character => "character",
            IssueKind::ExtraDelimiter => "extraDelimiter",
            IssueKind::CommaMissing => "commaMissing",
            IssueKind::Valid => "valid",
            IssueKind::Comma => "comma",
            IssueKind::Tilde => "tilde",
            IssueKind::Duplicate => "duplicate",
            IssueKind::Unique => "unique",
            IssueKind::RequireChild => "requireChild",
            IssueKind::Unit => "unit",
            IssueKind::IsNumeric => "isNumeric",
            IssueKind::Cap => "cap",
            IssueKind::UnitClass => "unitClass",
            IssueKind::Required => "required",
        }
    }

    /// Severity every issue of this kind carries
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueKind::Cap | IssueKind::UnitClass | IssueKind::Required => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The exact set of fields this kind's template references
    pub fn declared_fields(&self) -> &'static [Field] {
        match self {
            IssueKind::Bracket => &[
                Field::Tag,
                Field::OpeningBracketCount,
                Field::ClosingBracketCount,
            ],
            IssueKind::Character | IssueKind::ExtraDelimiter => {
                &[Field::Character, Field::Index]
            }
            IssueKind::CommaMissing => &[Field::Tag, Field::Index],
            IssueKind::Comma => &[Field::PreviousTag, Field::Tag],
            IssueKind::UnitClass => &[Field::Tag, Field::DefaultUnit],
            IssueKind::Unique | IssueKind::Required => &[Field::TagPrefix],
            IssueKind::Valid
            | IssueKind::Tilde
            | IssueKind::Duplicate
            | IssueKind::RequireChild
            | IssueKind::Unit
            | IssueKind::IsNumeric
            | IssueKind::Cap => &[Field::Tag],
        }
    }

    fn render(&self, fields: &IssueFields) -> String {
        let text = |field| fields.text(field);
        match self {
            IssueKind::Bracket => format!(
                "Number of opening and closing parentheses are unequal. {} opening parentheses. {} closing parentheses - \"{}\"",
                text(Field::OpeningBracketCount),
                text(Field::ClosingBracketCount),
                text(Field::Tag)
            ),
            IssueKind::Character => format!(
                "Invalid character '{}' at index {}",
                text(Field::Character),
                text(Field::Index)
            ),
            IssueKind::ExtraDelimiter => format!(
                "Extra delimiter '{}' at index {}",
                text(Field::Character),
                text(Field::Index)
            ),
            IssueKind::CommaMissing => format!(
                "Comma missing after - \"{}\" at index {}",
                text(Field::Tag),
                text(Field::Index)
            ),
            IssueKind::Valid => format!("Invalid HED tag - \"{}\"", text(Field::Tag)),
            IssueKind::Comma => format!(
                "Either \"{}\" contains a comma when it should not or \"{}\" is not a valid tag",
                text(Field::PreviousTag),
                text(Field::Tag)
            ),
            IssueKind::Tilde => format!("Too many tildes - group \"{}\"", text(Field::Tag)),
            IssueKind::Duplicate => format!("Duplicate tag - \"{}\"", text(Field::Tag)),
            IssueKind::Unique => format!(
                "Multiple unique tags with prefix - \"{}\"",
                text(Field::TagPrefix)
            ),
            IssueKind::RequireChild => {
                format!("Descendant tag required - \"{}\"", text(Field::Tag))
            }
            IssueKind::Unit => format!("Invalid unit - \"{}\"", text(Field::Tag)),
            IssueKind::IsNumeric => format!("Invalid numeric value - \"{}\"", text(Field::Tag)),
            IssueKind::Cap => format!(
                "First word not capitalized or camel case - \"{}\"",
                text(Field::Tag)
            ),
            IssueKind::UnitClass => format!(
                "No unit specified. Using \"{}\" as the default - \"{}\"",
                text(Field::DefaultUnit),
                text(Field::Tag)
            ),
            IssueKind::Required => format!(
                "Tag with prefix \"{}\" is required",
                text(Field::TagPrefix)
            ),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Named field values attached to an issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueFields {
    /// Original-cased tag or group text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Original-cased tag preceding `tag`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_tag: Option<String>,
    /// Offending character
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<char>,
    /// 0-based character index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Number of `(`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_bracket_count: Option<usize>,
    /// Number of `)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_bracket_count: Option<usize>,
    /// Schema path prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,
    /// Default unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
}

impl IssueFields {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the previous tag
    pub fn with_previous_tag(mut self, tag: impl Into<String>) -> Self {
        self.previous_tag = Some(tag.into());
        self
    }

    /// Set the character
    pub fn with_character(mut self, character: char) -> Self {
        self.character = Some(character);
        self
    }

    /// Set the index
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set both bracket counts
    pub fn with_bracket_counts(mut self, opening: usize, closing: usize) -> Self {
        self.opening_bracket_count = Some(opening);
        self.closing_bracket_count = Some(closing);
        self
    }

    /// Set the tag prefix
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    /// Set the default unit
    pub fn with_default_unit(mut self, unit: impl Into<String>) -> Self {
        self.default_unit = Some(unit.into());
        self
    }

    /// Check whether a field has a value
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Tag => self.tag.is_some(),
            Field::PreviousTag => self.previous_tag.is_some(),
            Field::Character => self.character.is_some(),
            Field::Index => self.index.is_some(),
            Field::OpeningBracketCount => self.opening_bracket_count.is_some(),
            Field::ClosingBracketCount => self.closing_bracket_count.is_some(),
            Field::TagPrefix => self.tag_prefix.is_some(),
            Field::DefaultUnit => self.default_unit.is_some(),
        }
    }

    /// Render a field value as text (empty when absent)
    pub fn text(&self, field: Field) -> String {
        match field {
            Field::Tag => self.tag.clone().unwrap_or_default(),
            Field::PreviousTag => self.previous_tag.clone().unwrap_or_default(),
            Field::Character => self.character.map(String::from).unwrap_or_default(),
            Field::Index => self.index.map(|i| i.to_string()).unwrap_or_default(),
            Field::OpeningBracketCount => self
                .opening_bracket_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            Field::ClosingBracketCount => self
                .closing_bracket_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            Field::TagPrefix => self.tag_prefix.clone().unwrap_or_default(),
            Field::DefaultUnit => self.default_unit.clone().unwrap_or_default(),
        }
    }
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    kind: IssueKind,
    severity: Severity,
    #[serde(flatten)]
    fields: IssueFields,
    message: String,
}

impl Issue {
    /// Issue kind
    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    /// Issue severity
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Field values
    pub fn fields(&self) -> &IssueFields {
        &self.fields
    }

    /// Rendered message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `tag` field, if the kind declares one
    pub fn tag(&self) -> Option<&str> {
        self.fields.tag.as_deref()
    }

    /// Check if this issue is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this issue is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Build an error-severity issue
///
/// # Panics
///
/// Panics if `kind` is not an error kind, or if `fields` does not carry
/// exactly the fields `kind` declares.
pub fn report_error(kind: IssueKind, fields: IssueFields) -> Issue {
    report(kind, Severity::Error, fields)
}

/// Build a warning-severity issue
///
/// # Panics
///
/// Panics if `kind` is not a warning kind, or if `fields` does not carry
/// exactly the fields `kind` declares.
pub fn report_warning(kind: IssueKind, fields: IssueFields) -> Issue {
    report(kind, Severity::Warning, fields)
}

fn report(kind: IssueKind, severity: Severity, fields: IssueFields) -> Issue {
    if kind.default_severity() != severity {
        panic!(
            "issue kind '{}' is reported as {}, not {}",
            kind.code(),
            kind.default_severity().label(),
            severity.label()
        );
    }

    let declared = kind.declared_fields();
    for field in Field::ALL {
        let is_declared = declared.contains(&field);
        let is_present = fields.has(field);
        if is_present && !is_declared {
            panic!(
                "issue kind '{}' does not declare field '{}'",
                kind.code(),
                field.name()
            );
        }
        if is_declared && !is_present {
            panic!(
                "issue kind '{}' requires field '{}'",
                kind.code(),
                field.name()
            );
        }
    }

    let message = format!("{}: {}", severity.label(), kind.render(&fields));
    Issue {
        kind,
        severity,
        fields,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_message() {
        let issue = report_error(
            IssueKind::Bracket,
            IssueFields::new().with_tag("((A,B)").with_bracket_counts(2, 1),
        );
        assert_eq!(
            issue.message(),
            "ERROR: Number of opening and closing parentheses are unequal. 2 opening parentheses. 1 closing parentheses - \"((A,B)\""
        );
        assert!(issue.is_error());
    }

    #[test]
    fn test_warning_prefix() {
        let issue = report_warning(
            IssueKind::UnitClass,
            IssueFields::new()
                .with_tag("Event/Duration/3")
                .with_default_unit("s"),
        );
        assert!(issue.is_warning());
        assert_eq!(
            issue.to_string(),
            "WARNING: No unit specified. Using \"s\" as the default - \"Event/Duration/3\""
        );
    }

    #[test]
    fn test_comma_message() {
        let issue = report_error(
            IssueKind::Comma,
            IssueFields::new()
                .with_previous_tag("Event/Label/This is a label")
                .with_tag("This/Is/A/Tag"),
        );
        assert!(issue.message().contains("\"Event/Label/This is a label\" contains a comma"));
        assert_eq!(issue.tag(), Some("This/Is/A/Tag"));
    }

    #[test]
    #[should_panic(expected = "does not declare field 'index'")]
    fn test_undeclared_field_panics() {
        report_error(IssueKind::Valid, IssueFields::new().with_tag("A").with_index(3));
    }

    #[test]
    #[should_panic(expected = "requires field 'tag_prefix'")]
    fn test_missing_field_panics() {
        report_warning(IssueKind::Required, IssueFields::new());
    }

    #[test]
    fn test_every_kind_renders_with_declared_fields() {
        let kinds = [
            IssueKind::Bracket,
            IssueKind::Character,
            IssueKind::ExtraDelimiter,
            IssueKind::CommaMissing,
            IssueKind::Valid,
            IssueKind::Comma,
            IssueKind::Tilde,
            IssueKind::Duplicate,
            IssueKind::Unique,
            IssueKind::RequireChild,
            IssueKind::Unit,
            IssueKind::IsNumeric,
            IssueKind::Cap,
            IssueKind::UnitClass,
            IssueKind::Required,
        ];
        for kind in kinds {
            let mut fields = IssueFields::new();
            for field in kind.declared_fields() {
                fields = match field {
                    Field::Tag => fields.with_tag("T"),
                    Field::PreviousTag => fields.with_previous_tag("P"),
                    Field::Character => fields.with_character(','),
                    Field::Index => fields.with_index(0),
                    Field::OpeningBracketCount | Field::ClosingBracketCount => {
                        fields.with_bracket_counts(1, 0)
                    }
                    Field::TagPrefix => fields.with_tag_prefix("X"),
                    Field::DefaultUnit => fields.with_default_unit("s"),
                };
            }
            let issue = report(kind, kind.default_severity(), fields);
            let prefix = format!("{}: ", kind.default_severity().label());
            assert!(issue.message().starts_with(&prefix), "{}", kind);
        }
    }

    #[test]
    #[should_panic(expected = "issue kind 'cap' is reported as WARNING, not ERROR")]
    fn test_warning_kind_as_error_panics() {
        report_error(IssueKind::Cap, IssueFields::new().with_tag("Event/nope"));
    }

    #[test]
    #[should_panic(expected = "issue kind 'valid' is reported as ERROR, not WARNING")]
    fn test_error_kind_as_warning_panics() {
        report_warning(IssueKind::Valid, IssueFields::new().with_tag("Event/Nope"));
    }

    #[test]
    fn test_default_severities() {
        let warnings = [IssueKind::Cap, IssueKind::UnitClass, IssueKind::Required];
        for kind in warnings {
            assert_eq!(kind.default_severity(), Severity::Warning);
        }
        assert_eq!(IssueKind::Unique.default_severity(), Severity::Error);
        assert_eq!(IssueKind::Bracket.default_severity(), Severity::Error);
    }

    #[test]
    fn test_serialize_uses_codes() {
        let issue = report_error(
            IssueKind::ExtraDelimiter,
            IssueFields::new().with_character('~').with_index(0),
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "extraDelimiter");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["character"], "~");
        assert_eq!(json["index"], 0);
        assert!(json.get("tag").is_none());
    }
}
