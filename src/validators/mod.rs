//! HED string validation
//!
//! [`TagValidator`] runs the rule tiers over a parsed string:
//!
//! 1. structural issues from the parser;
//! 2. per-tag rules ([`tags`]), in document order;
//! 3. group rules ([`groups`]), in document order;
//! 4. whole-string rules: top-level duplicates, then [`strings`] (unique,
//!    required).
//!
//! Each rule is a pure function of the parsed structure, the schema and the
//! configuration.

pub mod config;
pub mod groups;
pub mod strings;
pub mod tags;
pub mod units;

use std::sync::Arc;

use crate::delimiter::{parse_hed_string, HedNode, HedTag, ParsedHedString};
use crate::issues::Issue;
use crate::schema::SchemaDictionary;

pub use config::ValidatorConfig;
pub use tags::{resolve, Resolution};

/// Validates HED strings against a shared schema
#[derive(Debug, Clone)]
pub struct TagValidator {
    schema: Arc<SchemaDictionary>,
    config: ValidatorConfig,
}

impl TagValidator {
    /// Create a validator
    pub fn new(schema: Arc<SchemaDictionary>, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    /// Schema in use
    pub fn schema(&self) -> &SchemaDictionary {
        &self.schema
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Parse and validate a string
    pub fn validate_hed_string(&self, hed_string: &str) -> Vec<Issue> {
        let parsed = parse_hed_string(hed_string);
        let issues = self.validate_structure(&parsed);
        tracing::trace!(hed_string, issues = issues.len(), "validated HED string");
        issues
    }

    /// Validate an already parsed string
    pub fn validate_structure(&self, parsed: &ParsedHedString) -> Vec<Issue> {
        let mut issues = parsed.issues.clone();
        issues.extend(self.tag_issues(parsed));
        issues.extend(self.group_issues(parsed));
        issues.extend(self.string_issues(parsed));
        issues
    }

    fn tag_issues(&self, parsed: &ParsedHedString) -> Vec<Issue> {
        struct Sequence<'p, 's> {
            nodes: std::slice::Iter<'p, HedNode>,
            previous: Option<(&'p HedTag, Resolution<'s>)>,
        }

        let schema = self.schema.as_ref();
        let mut issues = Vec::new();
        let mut stack = vec![Sequence {
            nodes: parsed.structure.nodes().iter(),
            previous: None,
        }];

        while let Some(sequence) = stack.last_mut() {
            match sequence.nodes.next() {
                Some(HedNode::Tag(tag)) => {
                    let resolution = resolve(schema, tag);
                    let previous = sequence
                        .previous
                        .as_ref()
                        .map(|(previous, resolution)| (*previous, resolution));
                    issues.extend(tags::check_tag(
                        schema,
                        &self.config,
                        tag,
                        &resolution,
                        previous,
                    ));
                    sequence.previous = Some((tag, resolution));
                }
                Some(HedNode::Group(group)) => {
                    sequence.previous = None;
                    stack.push(Sequence {
                        nodes: group.children().iter(),
                        previous: None,
                    });
                }
                None => {
                    stack.pop();
                }
            }
        }
        issues
    }

    fn group_issues(&self, parsed: &ParsedHedString) -> Vec<Issue> {
        let mut issues = Vec::new();
        for group in parsed.structure.groups() {
            issues.extend(groups::check_tilde_bound(group));
            if self.config.run_semantic_validation {
                issues.extend(groups::check_duplicates(group.tags()));
            }
        }
        issues
    }

    fn string_issues(&self, parsed: &ParsedHedString) -> Vec<Issue> {
        if !self.config.run_semantic_validation {
            return Vec::new();
        }
        let all_tags = parsed.structure.tags();
        let mut issues = groups::check_duplicates(parsed.structure.top_level_tags());
        issues.extend(strings::check_unique(&self.schema, &all_tags));
        if self.config.semantic_warnings() {
            issues.extend(strings::check_required(&self.schema, &all_tags));
        }
        issues
    }
}
