//! Two-pass assembler for the target instruction text
//!
//! The first pass binds `(LABEL)` definitions to ROM addresses, the
//! second resolves `@symbol` operands, allocating unknown symbols as
//! variables from address 16 upwards.

use log::debug;
use std::collections::HashMap;
use thiserror::Error;
use vmt_codegen::{Comp, Dest, Jump, ParseAsmError};

/// First RAM address handed out to variables
const VARIABLE_BASE: u16 = 16;

/// Largest value an `@` instruction can load
const MAX_LITERAL: u32 = 0x7FFF;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: label '{label}' is already defined")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: literal {value} does not fit in 15 bits")]
    LiteralRange { line: usize, value: String },
}

/// One ROM word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// A = value
    Load(u16),
    /// dest = comp ; jump
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
}

impl Op {
    /// `0;JMP` and friends
    pub fn is_unconditional_jump(&self) -> bool {
        matches!(
            self,
            Op::Compute {
                dest: None,
                jump: Some(Jump::JMP),
                ..
            }
        )
    }
}

/// An assembled program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub ops: Vec<Op>,
    /// Labels and variables, with their values
    pub symbols: HashMap<String, u16>,
}

impl Program {
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }
}

/// A parsed source line before symbol resolution
#[derive(Debug, Clone)]
enum ParsedLine {
    Label(String),
    LoadLiteral(u16),
    LoadSymbol(String),
    Compute(Op),
}

pub struct Assembler {
    predefined: HashMap<String, u16>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        let mut predefined = HashMap::new();
        for (name, value) in [("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4)] {
            predefined.insert(name.to_string(), value);
        }
        for r in 0..16u16 {
            predefined.insert(format!("R{}", r), r);
        }
        predefined.insert("SCREEN".to_string(), 16384);
        predefined.insert("KBD".to_string(), 24576);
        Self { predefined }
    }

    pub fn assemble(&self, source: &str) -> Result<Program, Vec<AsmError>> {
        let mut errors = Vec::new();
        let mut parsed = Vec::new();

        for (i, raw) in source.lines().enumerate() {
            match parse_line(raw, i + 1) {
                Ok(Some(line)) => parsed.push((i + 1, line)),
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        // First pass: labels
        let mut symbols: HashMap<String, u16> = HashMap::new();
        let mut rom_address: u16 = 0;
        for (line_number, line) in &parsed {
            match line {
                ParsedLine::Label(label) => {
                    if symbols.contains_key(label) || self.predefined.contains_key(label) {
                        errors.push(AsmError::DuplicateLabel {
                            line: *line_number,
                            label: label.clone(),
                        });
                    } else {
                        symbols.insert(label.clone(), rom_address);
                    }
                }
                _ => rom_address = rom_address.wrapping_add(1),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // Second pass: instructions and variables
        let mut ops = Vec::with_capacity(rom_address as usize);
        let mut next_variable = VARIABLE_BASE;
        for (_, line) in parsed {
            match line {
                ParsedLine::Label(_) => {}
                ParsedLine::LoadLiteral(value) => ops.push(Op::Load(value)),
                ParsedLine::LoadSymbol(name) => {
                    let known = self
                        .predefined
                        .get(&name)
                        .or_else(|| symbols.get(&name))
                        .copied();
                    let value = match known {
                        Some(value) => value,
                        None => {
                            let address = next_variable;
                            debug!("allocating variable '{}' at {}", name, address);
                            symbols.insert(name, address);
                            next_variable += 1;
                            address
                        }
                    };
                    ops.push(Op::Load(value));
                }
                ParsedLine::Compute(op) => ops.push(op),
            }
        }

        debug!("assembled {} instructions, {} symbols", ops.len(), symbols.len());
        Ok(Program { ops, symbols })
    }
}

fn parse_line(raw: &str, line: usize) -> Result<Option<ParsedLine>, AsmError> {
    let text = match raw.find("//") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    if text.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = text.strip_prefix('(') {
        let label = rest.strip_suffix(')').ok_or_else(|| AsmError::Syntax {
            line,
            message: format!("unterminated label '{}'", text),
        })?;
        if label.is_empty() {
            return Err(AsmError::Syntax {
                line,
                message: "empty label".to_string(),
            });
        }
        return Ok(Some(ParsedLine::Label(label.to_string())));
    }

    if let Some(operand) = text.strip_prefix('@') {
        if operand.is_empty() {
            return Err(AsmError::Syntax {
                line,
                message: "missing operand after '@'".to_string(),
            });
        }
        if operand.chars().all(|c| c.is_ascii_digit()) {
            return match operand.parse::<u32>() {
                Ok(value) if value <= MAX_LITERAL => Ok(Some(ParsedLine::LoadLiteral(value as u16))),
                _ => Err(AsmError::LiteralRange {
                    line,
                    value: operand.to_string(),
                }),
            };
        }
        return Ok(Some(ParsedLine::LoadSymbol(operand.to_string())));
    }

    parse_compute(&text)
        .map(|op| Some(ParsedLine::Compute(op)))
        .map_err(|err| AsmError::Syntax {
            line,
            message: err.to_string(),
        })
}

fn parse_compute(text: &str) -> Result<Op, ParseAsmError> {
    let (dest, rest) = match text.split_once('=') {
        Some((dest, rest)) => (Some(dest.parse::<Dest>()?), rest),
        None => (None, text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Some(jump.parse::<Jump>()?)),
        None => (rest, None),
    };
    Ok(Op::Compute {
        dest,
        comp: comp.parse::<Comp>()?,
        jump,
    })
}
