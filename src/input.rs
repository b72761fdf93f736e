//! Tab-separated annotation files
//!
//! Each row's tag columns are joined into one HED string and validated.
//! Optional per-column prefixes turn bare values such as a label column into
//! full tags.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::issues::Issue;
use crate::validators::TagValidator;

/// Which columns of a TSV file hold tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSpec {
    /// 1-based tag column numbers
    pub tag_columns: Vec<usize>,
    /// Prefix prepended to every cell of a column (1-based)
    pub prefixes: BTreeMap<usize, String>,
    /// Whether the first line is a header row
    pub has_headers: bool,
}

impl ColumnSpec {
    /// Tag columns with a header row
    pub fn new(tag_columns: impl IntoIterator<Item = usize>) -> Self {
        Self {
            tag_columns: tag_columns.into_iter().collect(),
            prefixes: BTreeMap::new(),
            has_headers: true,
        }
    }

    /// Prefix a column's cells
    pub fn with_prefix(mut self, column: usize, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(column, prefix.into());
        if !self.tag_columns.contains(&column) {
            self.tag_columns.push(column);
        }
        self
    }

    /// Set whether the first line is a header row
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Parse a `2,3` column list
    pub fn parse_columns(list: &str) -> Result<Vec<usize>> {
        list.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| match c.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(Error::Resource(format!("invalid column number '{}'", c))),
            })
            .collect()
    }

    /// Parse a `3=Event/Label/` column prefix
    pub fn parse_prefix(text: &str) -> Result<(usize, String)> {
        let (column, prefix) = text
            .split_once('=')
            .ok_or_else(|| Error::Resource(format!("expected COLUMN=PREFIX, got '{}'", text)))?;
        let columns = Self::parse_columns(column)?;
        match columns.as_slice() {
            [column] => Ok((*column, prefix.to_string())),
            _ => Err(Error::Resource(format!("invalid prefix column '{}'", column))),
        }
    }

    fn cell_tags(&self, cells: &[&str]) -> Vec<String> {
        let mut tags = Vec::new();
        for &column in &self.tag_columns {
            let cell = match column.checked_sub(1).and_then(|i| cells.get(i)) {
                Some(cell) => strip_quotes(cell.trim()),
                None => continue,
            };
            if cell.is_empty() {
                continue;
            }
            match self.prefixes.get(&column) {
                Some(prefix) if !cell.to_lowercase().starts_with(&prefix.to_lowercase()) => {
                    tags.push(format!("{}{}", prefix, cell));
                }
                _ => tags.push(cell.to_string()),
            }
        }
        tags
    }
}

fn strip_quotes(cell: &str) -> &str {
    cell.strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
        .unwrap_or(cell)
}

/// Issues found on one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssues {
    /// 1-based line number
    pub row: usize,
    /// Issues, in validator order
    pub issues: Vec<Issue>,
}

/// Validates the tag columns of tab-separated text
#[derive(Debug, Clone)]
pub struct HedInputReader {
    validator: TagValidator,
    columns: ColumnSpec,
}

impl HedInputReader {
    /// Create a reader
    pub fn new(validator: TagValidator, columns: ColumnSpec) -> Self {
        Self { validator, columns }
    }

    /// Validate every row; rows without issues are left out
    pub fn validate_tsv(&self, text: &str) -> Vec<RowIssues> {
        let skip = usize::from(self.columns.has_headers);
        text.lines()
            .enumerate()
            .skip(skip)
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| {
                let cells: Vec<&str> = line.split('\t').collect();
                let hed_string = self.columns.cell_tags(&cells).join(",");
                let issues = self.validator.validate_hed_string(&hed_string);
                (!issues.is_empty()).then(|| RowIssues {
                    row: index + 1,
                    issues,
                })
            })
            .collect()
    }

    /// Read a file and validate it
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<Vec<RowIssues>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;
        let rows = self.validate_tsv(&text);
        tracing::debug!(
            file = %path.display(),
            rows_with_issues = rows.len(),
            "validated annotation file"
        );
        Ok(rows)
    }
}
