//! Parsed VM commands
//!
//! A `Command` is one line of the stack VM language after the reader has
//! split it into keyword and arguments. Segment names and arithmetic
//! keywords are kept as written; the backend decides whether they are
//! valid so that it can report them alongside the source line.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The instruction carried by a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// add, sub, neg, eq, gt, lt, and, or, not
    Arithmetic(String),
    Push { segment: String, index: u16 },
    Pop { segment: String, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Arithmetic(op) => write!(f, "{}", op),
            Opcode::Push { segment, index } => write!(f, "push {} {}", segment, index),
            Opcode::Pop { segment, index } => write!(f, "pop {} {}", segment, index),
            Opcode::Label(name) => write!(f, "label {}", name),
            Opcode::Goto(name) => write!(f, "goto {}", name),
            Opcode::IfGoto(name) => write!(f, "if-goto {}", name),
            Opcode::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Opcode::Call { name, args } => write!(f, "call {} {}", name, args),
            Opcode::Return => write!(f, "return"),
        }
    }
}

/// One parsed VM instruction with the text it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub opcode: Opcode,
    pub source_text: String,
    pub location: SourceLocation,
}

impl Command {
    pub fn new(opcode: Opcode, source_text: &str, location: SourceLocation) -> Self {
        Self {
            opcode,
            source_text: source_text.to_string(),
            location,
        }
    }

    /// Build a command with no real source line, using the opcode's
    /// canonical text. Used for generated code and in tests.
    pub fn synthetic(opcode: Opcode) -> Self {
        let text = opcode.to_string();
        Self::new(opcode, &text, SourceLocation::dummy())
    }

    pub fn source_line(&self) -> u32 {
        self.location.line
    }

    pub fn is_push(&self) -> bool {
        matches!(self.opcode, Opcode::Push { .. })
    }

    pub fn is_pop(&self) -> bool {
        matches!(self.opcode, Opcode::Pop { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_display() {
        let push = Opcode::Push {
            segment: "local".to_string(),
            index: 2,
        };
        assert_eq!(push.to_string(), "push local 2");
        assert_eq!(Opcode::IfGoto("LOOP".to_string()).to_string(), "if-goto LOOP");
        assert_eq!(
            Opcode::Call {
                name: "Math.multiply".to_string(),
                args: 2
            }
            .to_string(),
            "call Math.multiply 2"
        );
        assert_eq!(Opcode::Arithmetic("add".to_string()).to_string(), "add");
    }

    #[test]
    fn test_synthetic_command() {
        let cmd = Command::synthetic(Opcode::Return);
        assert_eq!(cmd.source_text, "return");
        assert_eq!(cmd.source_line(), 0);
        assert!(!cmd.is_push());
    }
}
