use crate::lexer::Line;
use vmt_common::{Command, Opcode, SourceLocation, VmError};

/// Turns scanned lines into commands
///
/// Only the shape of a line is checked here: keyword, argument count
/// and numeric arguments. Segment names and arithmetic keywords are
/// validated by the backend.
pub struct Parser<'m> {
    module: &'m str,
}

impl<'m> Parser<'m> {
    pub fn new(module: &'m str) -> Self {
        Self { module }
    }

    pub fn parse_line(&self, line: &Line<'_>) -> Result<Command, VmError> {
        let location = SourceLocation::new(self.module, line.line);
        let opcode = self.parse_opcode(&line.words, &location)?;
        Ok(Command::new(opcode, line.text, location))
    }

    fn parse_opcode(&self, words: &[&str], location: &SourceLocation) -> Result<Opcode, VmError> {
        let (keyword, args) = match words.split_first() {
            Some(split) => split,
            None => return Err(self.error("empty command", location)),
        };

        let opcode = match *keyword {
            "push" | "pop" => {
                self.expect_args(keyword, args, 2, location)?;
                let segment = args[0].to_string();
                let index = self.parse_number(args[1], location)?;
                if *keyword == "push" {
                    Opcode::Push { segment, index }
                } else {
                    Opcode::Pop { segment, index }
                }
            }
            "label" => {
                self.expect_args(keyword, args, 1, location)?;
                Opcode::Label(args[0].to_string())
            }
            "goto" => {
                self.expect_args(keyword, args, 1, location)?;
                Opcode::Goto(args[0].to_string())
            }
            "if-goto" => {
                self.expect_args(keyword, args, 1, location)?;
                Opcode::IfGoto(args[0].to_string())
            }
            "function" => {
                self.expect_args(keyword, args, 2, location)?;
                Opcode::Function {
                    name: args[0].to_string(),
                    locals: self.parse_number(args[1], location)?,
                }
            }
            "call" => {
                self.expect_args(keyword, args, 2, location)?;
                Opcode::Call {
                    name: args[0].to_string(),
                    args: self.parse_number(args[1], location)?,
                }
            }
            "return" => {
                self.expect_args(keyword, args, 0, location)?;
                Opcode::Return
            }
            // Any other lone word is an arithmetic command
            op if args.is_empty() => Opcode::Arithmetic(op.to_string()),
            other => {
                return Err(self.error(&format!("unknown command '{}'", other), location));
            }
        };

        Ok(opcode)
    }

    fn expect_args(
        &self,
        keyword: &str,
        args: &[&str],
        expected: usize,
        location: &SourceLocation,
    ) -> Result<(), VmError> {
        if args.len() == expected {
            return Ok(());
        }
        Err(self.error(
            &format!(
                "'{}' takes {} argument{}, found {}",
                keyword,
                expected,
                if expected == 1 { "" } else { "s" },
                args.len()
            ),
            location,
        ))
    }

    fn parse_number(&self, text: &str, location: &SourceLocation) -> Result<u16, VmError> {
        text.parse::<u16>()
            .map_err(|_| self.error(&format!("expected a non-negative integer, found '{}'", text), location))
    }

    fn error(&self, message: &str, location: &SourceLocation) -> VmError {
        VmError::parse_error(message.to_string(), location.clone())
    }
}
