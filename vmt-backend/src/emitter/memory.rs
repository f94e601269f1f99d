//! Push, pop and fused push/pop lowering

use super::helpers::{
    assign, d_to_direct, operand_to_d, pointer_target_to_a, pointer_target_to_d, pop_to_d, push_d,
    store_via_sum,
};
use crate::segment::{Operand, Resolved};
use log::trace;
use vmt_codegen::{AsmInst, Comp, Dest, Reg};
use vmt_common::VmError;

/// Lower a push of a resolved segment reference
pub fn lower_push(source: &Resolved) -> Vec<AsmInst> {
    let mut insts = Vec::new();
    operand_to_d(&mut insts, &source.operand);
    push_d(&mut insts);
    insts
}

/// Lower a pop into a resolved segment reference
pub fn lower_pop(target: &Resolved) -> Result<Vec<AsmInst>, VmError> {
    let mut insts = Vec::new();

    match &target.operand {
        Operand::Immediate(_) => {
            return Err(VmError::InvalidPopTarget {
                segment: target.segment.name.to_string(),
            });
        }
        Operand::Direct(address) => {
            pop_to_d(&mut insts);
            d_to_direct(&mut insts, address);
        }
        Operand::Pointer { base, index } if *index <= 1 => {
            pop_to_d(&mut insts);
            pointer_target_to_a(&mut insts, *base, *index);
            insts.push(assign(Dest::M, Comp::D));
        }
        Operand::Pointer { base, index } => {
            pointer_target_to_d(&mut insts, *base, *index);
            store_via_sum(&mut insts, true);
        }
    }

    Ok(insts)
}

/// Lower `push source` immediately followed by `pop target` as a single
/// move. SP is never touched.
pub fn lower_push_pop(source: &Resolved, target: &Resolved) -> Result<Vec<AsmInst>, VmError> {
    let mut insts = Vec::new();

    if let Operand::Immediate(_) = target.operand {
        return Err(VmError::InvalidPopTarget {
            segment: target.segment.name.to_string(),
        });
    }

    operand_to_d(&mut insts, &source.operand);

    match &target.operand {
        Operand::Direct(address) => d_to_direct(&mut insts, address),
        Operand::Pointer { base, index } if *index <= 1 => {
            // A small offset reaches the target without touching D
            insts.push(AsmInst::at_reg(*base));
            let comp = if *index == 0 { Comp::M } else { Comp::MPlusOne };
            insts.push(assign(Dest::A, comp));
            insts.push(assign(Dest::M, Comp::D));
        }
        Operand::Pointer { base, index } => {
            // Park the value in the free cell at SP while the address is
            // computed, then store it the same way a pop does
            insts.push(AsmInst::at_reg(Reg::Sp));
            insts.push(assign(Dest::A, Comp::M));
            insts.push(assign(Dest::M, Comp::D));
            pointer_target_to_d(&mut insts, *base, *index);
            store_via_sum(&mut insts, false);
        }
        Operand::Immediate(_) => {}
    }

    trace!("fused push/pop lowered to {} instructions", insts.len());
    Ok(insts)
}
