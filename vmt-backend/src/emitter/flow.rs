//! Branching commands
//!
//! Labels are emitted exactly as written. Whether a jump target is ever
//! defined is left for the assembler to discover.

use super::helpers::pop_to_d;
use vmt_codegen::{AsmInst, Comp, Jump};

pub fn lower_label(name: &str) -> Vec<AsmInst> {
    vec![AsmInst::label(name)]
}

pub fn lower_goto(target: &str) -> Vec<AsmInst> {
    vec![AsmInst::at_label(target), AsmInst::jmp()]
}

/// Pop the stack top and jump when it is non-zero
pub fn lower_if_goto(target: &str) -> Vec<AsmInst> {
    let mut insts = Vec::new();
    pop_to_d(&mut insts);
    insts.push(AsmInst::at_label(target));
    insts.push(AsmInst::Branch(Comp::D, Jump::JNE));
    insts
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmt_codegen::emit_program;

    #[test]
    fn test_label_and_goto() {
        assert_eq!(emit_program(&lower_label("LOOP_START")), "(LOOP_START)\n");
        assert_eq!(emit_program(&lower_goto("LOOP_START")), "@LOOP_START\n0;JMP\n");
    }

    #[test]
    fn test_if_goto_pops_condition() {
        assert_eq!(
            emit_program(&lower_if_goto("END")),
            "@SP\nAM=M-1\nD=M\n@END\nD;JNE\n"
        );
    }
}
