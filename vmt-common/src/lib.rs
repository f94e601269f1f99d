//! Hack VM Translator - Common Types and Utilities
//! 
//! This crate contains the parsed VM command model, source locations,
//! error definitions and diagnostic reporting shared by the reader,
//! the backend and the driver.

pub mod command;
pub mod error;
pub mod source_loc;

pub use command::{Command, Opcode};
pub use error::{Diagnostic, ErrorReporter, Severity, VmError};
pub use source_loc::SourceLocation;
