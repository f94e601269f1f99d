//! Hack target machine: assembler and simulator
//!
//! Assembles the text the translator emits and runs it on a model of
//! the 16-bit two-register machine, so that translated programs can be
//! checked by their effect on memory rather than by their text.

pub mod assembler;
pub mod machine;

pub use assembler::{AsmError, Assembler, Op, Program};
pub use machine::{Machine, MachineError, MachineState, RunOutcome, RAM_SIZE};

/// Assemble `source` and load it into a fresh machine
pub fn load(source: &str) -> Result<Machine, Vec<AsmError>> {
    let program = Assembler::new().assemble(source)?;
    Ok(Machine::new(program))
}
