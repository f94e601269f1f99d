//! Hack VM Translator - Target Assembly Vocabulary
//!
//! This crate models the output side of the translator: the instruction
//! set of the 16-bit target machine and its textual form. It includes:
//!
//! - Typed assembly instructions and mnemonics
//! - Predefined symbols of the memory map
//! - Rendering of instruction sequences to assembly text

pub mod asm;
pub mod emit;

pub use asm::{Address, AsmInst, Comp, Dest, Jump, ParseAsmError, Reg};
pub use emit::{emit_program, instruction_count};
