//! Shared instruction sequences
//!
//! Small building blocks the lowering functions are assembled from.
//! Each one documents which registers it leaves meaningful.

use crate::segment::Operand;
use vmt_codegen::{Address, AsmInst, Comp, Dest, Reg};

pub(crate) fn assign(dest: Dest, comp: Comp) -> AsmInst {
    AsmInst::Assign(dest, comp)
}

/// Push D onto the stack. Clobbers A.
pub(crate) fn push_d(insts: &mut Vec<AsmInst>) {
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::AM, Comp::MPlusOne));
    insts.push(assign(Dest::A, Comp::AMinusOne));
    insts.push(assign(Dest::M, Comp::D));
}

/// Pop the stack top into D. Leaves A pointing at the vacated cell.
pub(crate) fn pop_to_d(insts: &mut Vec<AsmInst>) {
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::AM, Comp::MMinusOne));
    insts.push(assign(Dest::D, Comp::M));
}

/// Point A at the stack top (the cell below SP)
pub(crate) fn top_to_a(insts: &mut Vec<AsmInst>) {
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::A, Comp::MMinusOne));
}

/// Load `value` into D
pub(crate) fn constant_to_d(insts: &mut Vec<AsmInst>, value: u16) {
    match value {
        0 => insts.push(assign(Dest::D, Comp::Zero)),
        1 => insts.push(assign(Dest::D, Comp::One)),
        _ => {
            insts.push(AsmInst::at_const(value));
            insts.push(assign(Dest::D, Comp::A));
        }
    }
}

/// Point A at `RAM[base] + index`. Clobbers D when the index is
/// larger than one.
pub(crate) fn pointer_target_to_a(insts: &mut Vec<AsmInst>, base: Reg, index: u16) {
    insts.push(AsmInst::at_reg(base));
    match index {
        0 => insts.push(assign(Dest::A, Comp::M)),
        1 => insts.push(assign(Dest::A, Comp::MPlusOne)),
        _ => {
            insts.push(assign(Dest::D, Comp::M));
            insts.push(AsmInst::at_const(index));
            insts.push(assign(Dest::A, Comp::DPlusA));
        }
    }
}

/// Compute `RAM[base] + index` into D
pub(crate) fn pointer_target_to_d(insts: &mut Vec<AsmInst>, base: Reg, index: u16) {
    insts.push(AsmInst::at_reg(base));
    match index {
        0 => insts.push(assign(Dest::D, Comp::M)),
        1 => insts.push(assign(Dest::D, Comp::MPlusOne)),
        _ => {
            insts.push(assign(Dest::D, Comp::M));
            insts.push(AsmInst::at_const(index));
            insts.push(assign(Dest::D, Comp::DPlusA));
        }
    }
}

/// Load the value an operand denotes into D
pub(crate) fn operand_to_d(insts: &mut Vec<AsmInst>, operand: &Operand) {
    match operand {
        Operand::Immediate(value) => constant_to_d(insts, *value),
        Operand::Pointer { base, index } => {
            pointer_target_to_a(insts, *base, *index);
            insts.push(assign(Dest::D, Comp::M));
        }
        Operand::Direct(address) => {
            insts.push(AsmInst::At(address.clone()));
            insts.push(assign(Dest::D, Comp::M));
        }
    }
}

/// Store D into a known cell
pub(crate) fn d_to_direct(insts: &mut Vec<AsmInst>, address: &Address) {
    insts.push(AsmInst::At(address.clone()));
    insts.push(assign(Dest::M, Comp::D));
}

/// Write the value in `RAM[top]` to the address in D, where `top` is
/// the cell SP points at (`below == false`) or the stack top
/// (`below == true`).
///
/// Uses `(value + address) - value = address` and
/// `(value + address) - address = value`, so no scratch cell is needed
/// to hold the address while the value is fetched.
pub(crate) fn store_via_sum(insts: &mut Vec<AsmInst>, below: bool) {
    insts.push(AsmInst::at_reg(Reg::Sp));
    if below {
        insts.push(assign(Dest::AM, Comp::MMinusOne));
    } else {
        insts.push(assign(Dest::A, Comp::M));
    }
    insts.push(assign(Dest::D, Comp::DPlusM));
    insts.push(assign(Dest::A, Comp::DMinusM));
    insts.push(assign(Dest::M, Comp::DMinusA));
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmt_codegen::emit_program;

    fn text(build: impl FnOnce(&mut Vec<AsmInst>)) -> String {
        let mut insts = Vec::new();
        build(&mut insts);
        emit_program(&insts)
    }

    #[test]
    fn test_push_d() {
        assert_eq!(text(push_d), "@SP\nAM=M+1\nA=A-1\nM=D\n");
    }

    #[test]
    fn test_constant_to_d_shortcuts() {
        assert_eq!(text(|i| constant_to_d(i, 0)), "D=0\n");
        assert_eq!(text(|i| constant_to_d(i, 1)), "D=1\n");
        assert_eq!(text(|i| constant_to_d(i, 7)), "@7\nD=A\n");
    }

    #[test]
    fn test_pointer_target_small_offsets() {
        assert_eq!(text(|i| pointer_target_to_a(i, Reg::Lcl, 0)), "@LCL\nA=M\n");
        assert_eq!(text(|i| pointer_target_to_a(i, Reg::Lcl, 1)), "@LCL\nA=M+1\n");
        assert_eq!(text(|i| pointer_target_to_d(i, Reg::Arg, 4)), "@ARG\nD=M\n@4\nD=D+A\n");
    }

    #[test]
    fn test_store_via_sum() {
        assert_eq!(
            text(|i| store_via_sum(i, true)),
            "@SP\nAM=M-1\nD=D+M\nA=D-M\nM=D-A\n"
        );
    }
}
