//! Assembly text emission
//!
//! Renders instruction sequences as the line-oriented text the
//! assembler consumes. Labels start in column zero, everything else is
//! left unindented as well so that line-based tooling can diff output.

use crate::asm::AsmInst;

/// Render a complete program, one instruction per line with a trailing
/// newline
pub fn emit_program(instructions: &[AsmInst]) -> String {
    let mut out = String::with_capacity(instructions.len() * 8);
    for inst in instructions {
        out.push_str(&inst.to_string());
        out.push('\n');
    }
    out
}

/// Number of ROM words the sequence assembles to
pub fn instruction_count(instructions: &[AsmInst]) -> usize {
    instructions.iter().filter(|inst| inst.is_instruction()).count()
}
