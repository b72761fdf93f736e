//! Limits and constraints for schema loading
//!
//! Schema documents are external input. These limits bound the resources a
//! single document may consume while it is read and turned into a
//! [`SchemaDictionary`](crate::schema::SchemaDictionary).

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum schema document size in bytes
    pub max_schema_size: usize,

    /// Maximum node nesting depth in the tag tree
    pub max_schema_depth: usize,

    /// Maximum number of tag nodes
    pub max_schema_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_schema_size: 50 * 1024 * 1024, // 50 MB
            max_schema_depth: 64,
            max_schema_nodes: 200_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_schema_size: 5 * 1024 * 1024, // 5 MB
            max_schema_depth: 16,
            max_schema_nodes: 20_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_schema_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_depth: 1024,
            max_schema_nodes: 10_000_000,
        }
    }

    /// Check if the document size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the node nesting depth is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::LimitExceeded(format!(
                "schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of nodes is within limits
    pub fn check_schema_nodes(&self, count: usize) -> Result<()> {
        if count > self.max_schema_nodes {
            Err(Error::LimitExceeded(format!(
                "schema node count {} exceeds maximum {}",
                count, self.max_schema_nodes
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_schema_depth, 64);
        assert!(limits.check_schema_depth(10).is_ok());
        assert!(limits.check_schema_depth(65).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_schema_size < Limits::default().max_schema_size);
        assert!(limits.check_schema_size(6 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_schema_nodes > Limits::default().max_schema_nodes);
        assert!(limits.check_schema_nodes(1_000_000).is_ok());
    }

    #[test]
    fn test_limit_message() {
        let err = Limits::strict().check_schema_nodes(20_001).unwrap_err();
        assert!(err.to_string().contains("20001"));
    }
}
