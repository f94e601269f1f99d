//! Error handling for the VM translator
//!
//! This module defines the error taxonomy shared by the reader and the
//! backend, and the diagnostic collector used to report many errors per
//! run without aborting translation.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while reading or translating VM commands
///
/// None of these are fatal to a run. The command that raised one simply
/// produces no code and translation moves on to the next command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("invalid segment '{segment}'")]
    InvalidSegment { segment: String },

    #[error("unrecognized arithmetic command '{op}'")]
    UnrecognizedArithmeticOp { op: String },

    #[error("index {index} is out of range for segment '{segment}' (limit {limit})")]
    SegmentIndexOutOfRange {
        segment: String,
        index: u16,
        limit: u16,
    },

    #[error("call to '{callee}' passes {args} arguments (limit {limit})")]
    TooManyArguments { callee: String, args: u16, limit: u16 },

    #[error("cannot pop into segment '{segment}'")]
    InvalidPopTarget { segment: String },

    #[error("parse error at {location}: {message}")]
    Parse {
        location: SourceLocation,
        message: String,
    },
}

impl VmError {
    /// Create a parse error
    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        VmError::Parse { location, message }
    }

    /// Create an invalid segment error
    pub fn invalid_segment(segment: &str) -> Self {
        VmError::InvalidSegment {
            segment: segment.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
    /// The offending VM source line, when there is one
    pub source_text: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: SourceLocation) -> Self {
        Self::with_severity(Severity::Error, message, location)
    }

    pub fn warning(message: String, location: SourceLocation) -> Self {
        Self::with_severity(Severity::Warning, message, location)
    }

    fn with_severity(severity: Severity, message: String, location: SourceLocation) -> Self {
        Self {
            severity,
            message,
            location,
            source_text: None,
            notes: Vec::new(),
        }
    }

    pub fn with_source_text(mut self, text: &str) -> Self {
        self.source_text = Some(text.to_string());
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;

        if let Some(text) = &self.source_text {
            write!(f, " ({})", text)?;
        }

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Error reporter for collecting and displaying diagnostics
#[derive(Debug)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Record an already built diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        let index = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[index]
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, location: SourceLocation) -> &mut Diagnostic {
        self.report(Diagnostic::error(message, location))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, location: SourceLocation) -> &mut Diagnostic {
        self.report(Diagnostic::warning(message, location))
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Move every diagnostic out of `other` into this reporter
    pub fn absorb(&mut self, other: ErrorReporter) {
        for diagnostic in other.diagnostics {
            self.report(diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
