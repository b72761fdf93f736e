//! Annotation string parser
//!
//! Splits a raw HED string into tags and parenthesized groups in a single
//! left-to-right scan. The scan never fails: every malformed pattern becomes
//! an [`Issue`] and the best-effort structure is still returned.
//!
//! Nesting is tracked with an explicit frame stack rather than recursion, so
//! arbitrarily deep input cannot exhaust the call stack.

use std::ops::Range;

use crate::issues::{report_error, Issue, IssueFields, IssueKind};

/// Characters that may never appear in a HED string
pub const ILLEGAL_CHARACTERS: [char; 4] = ['{', '}', '[', ']'];

/// Normalize a tag for schema lookup
///
/// Trims whitespace, drops a leading and a trailing double quote, drops one
/// leading and one trailing slash, and lowercases the result.
pub fn format_tag(tag: &str) -> String {
    strip_decorations(tag).to_lowercase()
}

fn strip_decorations(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix('"').unwrap_or(tag);
    let tag = tag.strip_suffix('"').unwrap_or(tag);
    let tag = tag.strip_prefix('/').unwrap_or(tag);
    tag.strip_suffix('/').unwrap_or(tag)
}

/// A single tag occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedTag {
    span: Range<usize>,
    text: String,
    path: String,
    formatted: String,
    depth: usize,
    segment: usize,
}

impl HedTag {
    fn new(source: &str, span: Range<usize>, depth: usize, segment: usize) -> Self {
        let text = &source[span.clone()];
        let path = strip_decorations(text);
        Self {
            span,
            text: text.to_string(),
            path: path.to_string(),
            formatted: path.to_lowercase(),
            depth,
            segment,
        }
    }

    /// Byte range of the tag in the parsed string
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The tag as written, trimmed of surrounding whitespace
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The tag path as written, without quotes or boundary slashes
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Lowercase lookup form of the path
    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    /// Number of enclosing groups
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Index of the tilde-separated segment of the parent group holding the tag
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Slash-separated segments of [`path`](Self::path)
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }
}

/// A parenthesized group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    span: Range<usize>,
    text: String,
    depth: usize,
    segment: usize,
    children: Vec<HedNode>,
    tilde_count: usize,
}

impl TagGroup {
    /// Byte range from the opening parenthesis to the closing one, or to the
    /// end of the string when the group was never closed
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The group as written, parentheses included
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parenthesis nesting depth (1 for a top-level group)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Tilde segment of the enclosing group holding this group
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Direct children in order
    pub fn children(&self) -> &[HedNode] {
        &self.children
    }

    /// Direct child tags in order
    pub fn tags(&self) -> impl Iterator<Item = &HedTag> {
        self.children.iter().filter_map(HedNode::as_tag)
    }

    /// Number of `~` separators directly inside the group
    pub fn tilde_count(&self) -> usize {
        self.tilde_count
    }

    /// Number of top-level tilde-separated segments
    pub fn tilde_segment_count(&self) -> usize {
        self.tilde_count + 1
    }
}

/// One element of a tag sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HedNode {
    /// A tag
    Tag(HedTag),
    /// A nested group
    Group(TagGroup),
}

impl HedNode {
    /// The tag, if this is one
    pub fn as_tag(&self) -> Option<&HedTag> {
        match self {
            HedNode::Tag(tag) => Some(tag),
            HedNode::Group(_) => None,
        }
    }

    /// The group, if this is one
    pub fn as_group(&self) -> Option<&TagGroup> {
        match self {
            HedNode::Tag(_) => None,
            HedNode::Group(group) => Some(group),
        }
    }

    /// Original text of the node
    pub fn text(&self) -> &str {
        match self {
            HedNode::Tag(tag) => tag.text(),
            HedNode::Group(group) => group.text(),
        }
    }
}

/// The parsed tree of a HED string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HedStringStructure {
    nodes: Vec<HedNode>,
}

impl HedStringStructure {
    /// Top-level sequence
    pub fn nodes(&self) -> &[HedNode] {
        &self.nodes
    }

    /// Top-level tags
    pub fn top_level_tags(&self) -> impl Iterator<Item = &HedTag> {
        self.nodes.iter().filter_map(HedNode::as_tag)
    }

    /// Every node, depth-first in document order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.nodes.iter()],
        }
    }

    /// Every tag at any depth, in document order
    pub fn tags(&self) -> Vec<&HedTag> {
        self.walk().filter_map(HedNode::as_tag).collect()
    }

    /// Every group at any depth, in document order
    pub fn groups(&self) -> Vec<&TagGroup> {
        self.walk().filter_map(HedNode::as_group).collect()
    }

    /// Whether the string held no tags or groups
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Pre-order iterator over a [`HedStringStructure`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, HedNode>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a HedNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if let HedNode::Group(group) = node {
                        self.stack.push(group.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Parser output: the structure plus the structural issues found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHedString {
    /// Parsed tree
    pub structure: HedStringStructure,
    /// Structural issues, bracket issue first, then by position
    pub issues: Vec<Issue>,
}

impl ParsedHedString {
    /// Whether the parser reported anything
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// What the scan saw last in the current sequence
#[derive(Debug, Clone)]
enum Last {
    Start,
    Item { text: String },
    Separator { ch: char, index: usize, reported: bool },
}

/// An open sequence: the whole string or one group
#[derive(Debug)]
struct Frame {
    /// Byte offset of the opening parenthesis (None for the top level)
    open: Option<usize>,
    children: Vec<HedNode>,
    tilde_count: usize,
    last: Last,
}

impl Frame {
    fn new(open: Option<usize>) -> Self {
        Self {
            open,
            children: Vec::new(),
            tilde_count: 0,
            last: Last::Start,
        }
    }
}

/// Scan state
struct Parser<'s> {
    source: &'s str,
    frames: Vec<Frame>,
    positioned: Vec<(usize, Issue)>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            frames: vec![Frame::new(None)],
            positioned: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn current(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    fn report(&mut self, index: usize, kind: IssueKind, fields: IssueFields) {
        self.positioned.push((index, report_error(kind, fields)));
    }

    fn extra_delimiter(&mut self, ch: char, index: usize) {
        self.report(
            index,
            IssueKind::ExtraDelimiter,
            IssueFields::new().with_character(ch).with_index(index),
        );
    }

    /// Report a missing comma when an item directly follows another item
    fn check_adjacent(&mut self, index: usize) {
        let previous = match &self.current().last {
            Last::Item { text } => text.clone(),
            _ => return,
        };
        let fields = IssueFields::new().with_tag(previous).with_index(index);
        self.report(index, IssueKind::CommaMissing, fields);
    }

    fn text(&mut self, start: usize, end: usize, char_start: usize) {
        let raw = &self.source[start..end];
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let index = char_start + raw[..leading].chars().count();
        self.check_adjacent(index);

        let span = start + leading..start + leading + trimmed.len();
        let depth = self.depth();
        let segment = self.current().tilde_count;
        let tag = HedTag::new(self.source, span, depth, segment);
        let frame = self.current();
        frame.last = Last::Item {
            text: tag.text().to_string(),
        };
        frame.children.push(HedNode::Tag(tag));
    }

    fn delimiter(&mut self, ch: char, index: usize) {
        let at_top = self.frames.len() == 1;
        if ch == '~' && !at_top {
            self.current().tilde_count += 1;
        }

        let stray = (ch == '~' && at_top)
            || matches!(self.current().last, Last::Start | Last::Separator { .. });
        if stray {
            self.extra_delimiter(ch, index);
        }
        self.current().last = Last::Separator {
            ch,
            index,
            reported: stray,
        };
    }

    fn open(&mut self, byte: usize, index: usize) {
        self.check_adjacent(index);
        self.frames.push(Frame::new(Some(byte)));
    }

    /// Close the innermost group, ending it at byte offset `end`
    ///
    /// A stray `)` at the top level closes nothing but still ends the
    /// sequence before it.
    fn close(&mut self, end: usize) {
        self.finish_sequence();
        if self.frames.len() == 1 {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let start = frame.open.unwrap_or(0);
        let text = self.source[start..end].to_string();
        let depth = self.frames.len();
        let parent = self.current();
        let group = TagGroup {
            span: start..end,
            text,
            depth,
            segment: parent.tilde_count,
            children: frame.children,
            tilde_count: frame.tilde_count,
        };
        parent.last = Last::Item {
            text: group.text.clone(),
        };
        parent.children.push(HedNode::Group(group));
    }

    /// Report a separator left dangling at the end of the current sequence
    fn finish_sequence(&mut self) {
        let dangling = match self.current().last {
            Last::Separator {
                ch,
                index,
                reported: false,
            } => Some((ch, index)),
            _ => None,
        };
        if let Some((ch, index)) = dangling {
            self.extra_delimiter(ch, index);
            self.current().last = Last::Separator {
                ch,
                index,
                reported: true,
            };
        }
    }

    fn run(mut self) -> ParsedHedString {
        let source = self.source;
        let mut opening = 0;
        let mut closing = 0;
        let mut text_start: Option<(usize, usize)> = None;

        for (index, (byte, ch)) in source.char_indices().enumerate() {
            if ILLEGAL_CHARACTERS.contains(&ch) {
                self.report(
                    index,
                    IssueKind::Character,
                    IssueFields::new().with_character(ch).with_index(index),
                );
            }
            if !matches!(ch, ',' | '~' | '(' | ')') {
                if text_start.is_none() {
                    text_start = Some((byte, index));
                }
                continue;
            }

            if let Some((start, char_start)) = text_start.take() {
                self.text(start, byte, char_start);
            }
            match ch {
                '(' => {
                    opening += 1;
                    self.open(byte, index);
                }
                ')' => {
                    closing += 1;
                    self.close(byte + 1);
                }
                _ => self.delimiter(ch, index),
            }
        }
        if let Some((start, char_start)) = text_start.take() {
            self.text(start, source.len(), char_start);
        }
        while self.frames.len() > 1 {
            self.close(source.len());
        }
        self.finish_sequence();

        let mut issues = Vec::new();
        if opening != closing {
            issues.push(report_error(
                IssueKind::Bracket,
                IssueFields::new()
                    .with_tag(source.trim())
                    .with_bracket_counts(opening, closing),
            ));
        }
        self.positioned.sort_by_key(|(index, _)| *index);
        issues.extend(self.positioned.into_iter().map(|(_, issue)| issue));

        let nodes = self
            .frames
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        ParsedHedString {
            structure: HedStringStructure { nodes },
            issues,
        }
    }
}

/// Parse a HED string into its tag/group structure and structural issues
pub fn parse_hed_string(hed_string: &str) -> ParsedHedString {
    Parser::new(hed_string).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::Field;

    fn kinds(parsed: &ParsedHedString) -> Vec<IssueKind> {
        parsed.issues.iter().map(Issue::kind).collect()
    }

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag("  \"/Event/Label/\" "), "event/label");
        assert_eq!(format_tag("Item/Object"), "item/object");
        assert_eq!(format_tag("//a//"), "/a/");
    }

    #[test]
    fn test_simple_sequence() {
        let parsed = parse_hed_string("A/B, (C/D, E/F)");
        assert!(!parsed.has_issues());
        let nodes = parsed.structure.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text(), "A/B");
        let group = nodes[1].as_group().unwrap();
        assert_eq!(group.text(), "(C/D, E/F)");
        assert_eq!(group.depth(), 1);
        assert_eq!(group.children().len(), 2);
        assert_eq!(group.tags().nth(1).unwrap().depth(), 1);
    }

    #[test]
    fn test_tags_keep_original_casing() {
        let parsed = parse_hed_string("  Event/Label/Hello World ");
        let tags = parsed.structure.tags();
        assert_eq!(tags[0].text(), "Event/Label/Hello World");
        assert_eq!(tags[0].formatted(), "event/label/hello world");
        assert_eq!(tags[0].span(), 2..25);
    }

    #[test]
    fn test_nested_groups_preorder() {
        let parsed = parse_hed_string("((A, B), C), D");
        let texts: Vec<_> = parsed.structure.tags().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["A", "B", "C", "D"]);
        let groups = parsed.structure.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].depth(), 1);
        assert_eq!(groups[1].depth(), 2);
        assert_eq!(groups[1].text(), "(A, B)");
    }

    #[test]
    fn test_bracket_mismatch() {
        let parsed = parse_hed_string("((A/B,C/D),E/F");
        assert_eq!(kinds(&parsed), vec![IssueKind::Bracket]);
        let fields = parsed.issues[0].fields();
        assert_eq!(fields.text(Field::OpeningBracketCount), "2");
        assert_eq!(fields.text(Field::ClosingBracketCount), "1");
        assert_eq!(parsed.structure.groups()[0].text(), "((A/B,C/D),E/F");
    }

    #[test]
    fn test_stray_close_ignored() {
        let parsed = parse_hed_string("A, B), C");
        assert_eq!(kinds(&parsed), vec![IssueKind::Bracket]);
        assert_eq!(parsed.structure.tags().len(), 3);
    }

    #[test]
    fn test_leading_tilde_at_top_level() {
        let parsed = parse_hed_string("~A/B,(C/D)");
        assert_eq!(kinds(&parsed), vec![IssueKind::ExtraDelimiter]);
        let fields = parsed.issues[0].fields();
        assert_eq!(fields.text(Field::Character), "~");
        assert_eq!(fields.text(Field::Index), "0");
    }

    #[test]
    fn test_extra_delimiters() {
        let parsed = parse_hed_string(",A,,B,");
        let indices: Vec<_> = parsed
            .issues
            .iter()
            .map(|i| i.fields().text(Field::Index))
            .collect();
        assert_eq!(kinds(&parsed), vec![IssueKind::ExtraDelimiter; 3]);
        assert_eq!(indices, vec!["0", "3", "5"]);
    }

    #[test]
    fn test_delimiter_next_to_bracket() {
        let parsed = parse_hed_string("A,(,B),(C,)");
        let indices: Vec<_> = parsed
            .issues
            .iter()
            .map(|i| i.fields().text(Field::Index))
            .collect();
        assert_eq!(indices, vec!["3", "9"]);
    }

    #[test]
    fn test_tilde_segments() {
        let parsed = parse_hed_string("(A ~ B ~ C ~ D)");
        assert!(!parsed.has_issues());
        let group = parsed.structure.groups()[0];
        assert_eq!(group.tilde_segment_count(), 4);
        let segments: Vec<_> = group.tags().map(HedTag::segment).collect();
        assert_eq!(segments, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_missing_comma() {
        let parsed = parse_hed_string("A(B)");
        assert_eq!(kinds(&parsed), vec![IssueKind::CommaMissing]);
        assert_eq!(parsed.issues[0].tag(), Some("A"));
        assert_eq!(parsed.issues[0].fields().text(Field::Index), "1");

        let parsed = parse_hed_string("(A) B");
        assert_eq!(kinds(&parsed), vec![IssueKind::CommaMissing]);
        assert_eq!(parsed.issues[0].tag(), Some("(A)"));
        assert_eq!(parsed.issues[0].fields().text(Field::Index), "4");
    }

    #[test]
    fn test_delimiter_before_stray_closing_bracket() {
        let parsed = parse_hed_string("A,)B");
        assert_eq!(kinds(&parsed), vec![IssueKind::Bracket, IssueKind::ExtraDelimiter]);
        assert_eq!(parsed.issues[1].fields().text(Field::Character), ",");
        assert_eq!(parsed.issues[1].fields().text(Field::Index), "1");

        let parsed = parse_hed_string("A,)");
        assert_eq!(kinds(&parsed), vec![IssueKind::Bracket, IssueKind::ExtraDelimiter]);
    }

    #[test]
    fn test_illegal_characters() {
        let parsed = parse_hed_string("A{B},C");
        assert_eq!(kinds(&parsed), vec![IssueKind::Character, IssueKind::Character]);
        assert_eq!(parsed.issues[1].fields().text(Field::Character), "}");
        assert_eq!(parsed.issues[1].fields().text(Field::Index), "3");
    }

    #[test]
    fn test_indices_count_characters_not_bytes() {
        let parsed = parse_hed_string("é,,A");
        assert_eq!(parsed.issues[0].fields().text(Field::Index), "2");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(parse_hed_string("").structure.is_empty());
        let parsed = parse_hed_string("   ");
        assert!(parsed.structure.is_empty());
        assert!(!parsed.has_issues());
    }

    #[test]
    fn test_empty_group() {
        let parsed = parse_hed_string("A, ()");
        assert!(!parsed.has_issues());
        assert_eq!(parsed.structure.groups()[0].children().len(), 0);
    }

    #[test]
    fn test_deep_nesting_terminates() {
        let input = format!("{}A{}", "(".repeat(1000), ")".repeat(1000));
        let parsed = parse_hed_string(&input);
        assert!(!parsed.has_issues());
        assert_eq!(parsed.structure.tags()[0].depth(), 1000);
        assert_eq!(parsed.structure.groups().len(), 1000);
    }
}
