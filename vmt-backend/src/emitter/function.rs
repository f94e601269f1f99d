//! Function, call and return: the calling convention
//!
//! A call builds this frame on the shared stack, above the arguments:
//!
//! ```text
//!   ARG  -> argument 0 .. argument k-1
//!           return address
//!           saved LCL
//!           saved ARG
//!           saved THIS
//!           saved THAT
//!   LCL  -> local 0 .. local n-1
//! ```
//!
//! Return reads the frame back through R13 (frame pointer) and R14
//! (return address).

use super::helpers::{assign, push_d};
use crate::naming::{NameGenerator, END_LABEL};
use crate::segment::MAX_CONSTANT;
use log::debug;
use vmt_codegen::{AsmInst, Comp, Dest, Reg};
use vmt_common::VmError;

/// Stack base the bootstrap installs
pub const STACK_BASE: u16 = 256;

/// Cells a call pushes besides the arguments
pub const FRAME_SIZE: u16 = 5;

/// Pointers saved by a call, in push order
const SAVED_POINTERS: [Reg; 4] = [Reg::Lcl, Reg::Arg, Reg::This, Reg::That];

/// Register holding the frame pointer during return
const FRAME: Reg = Reg::R13;

/// Register holding the return address during return
const RETURN_ADDRESS: Reg = Reg::R14;

/// Entry label, then `locals` zeroed slots
///
/// The slots are cleared by walking A up the stack rather than by
/// repeated pushes, and SP is written once at the end.
pub fn lower_function(name: &str, locals: u16) -> Vec<AsmInst> {
    let mut insts = vec![AsmInst::label(name)];
    if locals == 0 {
        return insts;
    }

    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::A, Comp::M));
    for _ in 0..locals {
        insts.push(assign(Dest::M, Comp::Zero));
        insts.push(assign(Dest::A, Comp::APlusOne));
    }
    insts.push(assign(Dest::D, Comp::A));
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::M, Comp::D));
    insts
}

/// Exclusive bound on a call's argument count; `args + 5` is loaded as
/// an address literal
pub const MAX_CALL_ARGS: u16 = MAX_CONSTANT - FRAME_SIZE + 1;

/// Call `callee` with `args` arguments already on the stack
pub fn lower_call(naming: &mut NameGenerator, module: &str, callee: &str, args: u16) -> Result<Vec<AsmInst>, VmError> {
    if args >= MAX_CALL_ARGS {
        return Err(VmError::TooManyArguments {
            callee: callee.to_string(),
            args,
            limit: MAX_CALL_ARGS,
        });
    }
    Ok(call_sequence(naming, module, callee, args))
}

fn call_sequence(naming: &mut NameGenerator, module: &str, callee: &str, args: u16) -> Vec<AsmInst> {
    let return_label = naming.return_label(module, callee);
    debug!("call {} {} returns to {}", callee, args, return_label);

    let mut insts = Vec::new();

    insts.push(AsmInst::at_label(&return_label));
    insts.push(assign(Dest::D, Comp::A));
    push_d(&mut insts);

    for reg in SAVED_POINTERS {
        insts.push(AsmInst::at_reg(reg));
        insts.push(assign(Dest::D, Comp::M));
        push_d(&mut insts);
    }

    // LCL = SP
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::D, Comp::M));
    insts.push(AsmInst::at_reg(Reg::Lcl));
    insts.push(assign(Dest::M, Comp::D));

    // ARG = SP - 5 - args
    insts.push(AsmInst::at_const(args + FRAME_SIZE));
    insts.push(assign(Dest::D, Comp::DMinusA));
    insts.push(AsmInst::at_reg(Reg::Arg));
    insts.push(assign(Dest::M, Comp::D));

    insts.push(AsmInst::at_label(callee));
    insts.push(AsmInst::jmp());
    insts.push(AsmInst::label(&return_label));
    insts
}

/// Tear down the current frame and resume the caller
pub fn lower_return() -> Vec<AsmInst> {
    let mut insts = Vec::new();

    // FRAME = LCL
    insts.push(AsmInst::at_reg(Reg::Lcl));
    insts.push(assign(Dest::D, Comp::M));
    insts.push(AsmInst::at_reg(FRAME));
    insts.push(assign(Dest::M, Comp::D));

    // RET = *(FRAME - 5), read before the return value can overwrite it
    insts.push(AsmInst::at_const(FRAME_SIZE));
    insts.push(assign(Dest::A, Comp::DMinusA));
    insts.push(assign(Dest::D, Comp::M));
    insts.push(AsmInst::at_reg(RETURN_ADDRESS));
    insts.push(assign(Dest::M, Comp::D));

    // *ARG = pop()
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::AM, Comp::MMinusOne));
    insts.push(assign(Dest::D, Comp::M));
    insts.push(AsmInst::at_reg(Reg::Arg));
    insts.push(assign(Dest::A, Comp::M));
    insts.push(assign(Dest::M, Comp::D));

    // SP = ARG + 1
    insts.push(AsmInst::at_reg(Reg::Arg));
    insts.push(assign(Dest::D, Comp::MPlusOne));
    insts.push(AsmInst::at_reg(Reg::Sp));
    insts.push(assign(Dest::M, Comp::D));

    // THAT, THIS, ARG, LCL = *(--FRAME)
    for reg in SAVED_POINTERS.iter().rev() {
        insts.push(AsmInst::at_reg(FRAME));
        insts.push(assign(Dest::AM, Comp::MMinusOne));
        insts.push(assign(Dest::D, Comp::M));
        insts.push(AsmInst::at_reg(*reg));
        insts.push(assign(Dest::M, Comp::D));
    }

    insts.push(AsmInst::at_reg(RETURN_ADDRESS));
    insts.push(assign(Dest::A, Comp::M));
    insts.push(AsmInst::jmp());
    insts
}

/// SP = 256, then call the entry function with no arguments
pub fn lower_bootstrap(naming: &mut NameGenerator, module: &str, entry: &str) -> Vec<AsmInst> {
    let mut insts = vec![
        AsmInst::at_const(STACK_BASE),
        assign(Dest::D, Comp::A),
        AsmInst::at_reg(Reg::Sp),
        assign(Dest::M, Comp::D),
    ];
    insts.extend(call_sequence(naming, module, entry, 0));
    insts
}

/// Self-loop that keeps the machine from running off the program
pub fn lower_halt() -> Vec<AsmInst> {
    vec![
        AsmInst::label(END_LABEL),
        AsmInst::at_label(END_LABEL),
        AsmInst::jmp(),
    ]
}
