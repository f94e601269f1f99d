//! Source location tracking for error reporting
//!
//! VM source is line oriented, so a location is a module name plus a
//! 1-based line number. That is all the diagnostics ever need.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line in a VM module (line is 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub module: String,
    pub line: u32,
}

impl SourceLocation {
    /// Create a location within a module
    pub fn new(module: &str, line: u32) -> Self {
        Self {
            module: module.to_string(),
            line,
        }
    }

    /// Create a dummy location for testing and synthetic commands
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.line)
    }
}
