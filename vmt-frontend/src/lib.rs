//! VM source reader
//!
//! Scans the text of one VM module and yields parsed `Command`s lazily,
//! one per significant line. Malformed lines come out as `VmError::Parse`
//! items so the caller can report them and keep going.

pub mod lexer;
pub mod parser;


use log::trace;
use vmt_common::{Command, VmError};

pub use lexer::{Lexer, Line};
pub use parser::Parser;

/// Lazy command stream over one module's source text
pub struct CommandReader<'a> {
    lexer: Lexer<'a>,
    parser: Parser<'a>,
}

impl<'a> CommandReader<'a> {
    pub fn new(module: &'a str, source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            parser: Parser::new(module),
        }
    }
}

impl<'a> Iterator for CommandReader<'a> {
    type Item = Result<Command, VmError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lexer.next()?;
        let result = self.parser.parse_line(&line);
        trace!("line {}: {:?}", line.line, result);
        Some(result)
    }
}

/// Read a whole module, splitting commands from parse errors
pub fn read_module(module: &str, source: &str) -> (Vec<Command>, Vec<VmError>) {
    let mut commands = Vec::new();
    let mut errors = Vec::new();
    for item in CommandReader::new(module, source) {
        match item {
            Ok(command) => commands.push(command),
            Err(err) => errors.push(err),
        }
    }
    (commands, errors)
}
