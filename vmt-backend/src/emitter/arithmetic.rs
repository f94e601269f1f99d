//! Arithmetic, logical and comparison commands
//!
//! Binary operations pop the second operand into D and combine it with
//! the first operand in place, so the result never travels through D
//! and SP needs no second update.

use super::helpers::{assign, pop_to_d, top_to_a};
use crate::naming::NameGenerator;
use log::trace;
use std::str::FromStr;
use vmt_codegen::{AsmInst, Comp, Dest, Jump};
use vmt_common::VmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl FromStr for ArithmeticOp {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ArithmeticOp::Add),
            "sub" => Ok(ArithmeticOp::Sub),
            "neg" => Ok(ArithmeticOp::Neg),
            "eq" => Ok(ArithmeticOp::Eq),
            "gt" => Ok(ArithmeticOp::Gt),
            "lt" => Ok(ArithmeticOp::Lt),
            "and" => Ok(ArithmeticOp::And),
            "or" => Ok(ArithmeticOp::Or),
            "not" => Ok(ArithmeticOp::Not),
            _ => Err(VmError::UnrecognizedArithmeticOp { op: s.to_string() }),
        }
    }
}

enum Shape {
    /// `M = M op D`
    Binary(Comp),
    /// `M = op M`
    Unary(Comp),
    /// Compare `first - second` against a jump test
    Compare(Jump),
}

impl ArithmeticOp {
    fn shape(self) -> Shape {
        match self {
            ArithmeticOp::Add => Shape::Binary(Comp::DPlusM),
            ArithmeticOp::Sub => Shape::Binary(Comp::MMinusD),
            ArithmeticOp::And => Shape::Binary(Comp::DAndM),
            ArithmeticOp::Or => Shape::Binary(Comp::DOrM),
            ArithmeticOp::Neg => Shape::Unary(Comp::NegM),
            ArithmeticOp::Not => Shape::Unary(Comp::NotM),
            ArithmeticOp::Eq => Shape::Compare(Jump::JEQ),
            ArithmeticOp::Gt => Shape::Compare(Jump::JGT),
            ArithmeticOp::Lt => Shape::Compare(Jump::JLT),
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self.shape(), Shape::Compare(_))
    }
}

/// Lower an arithmetic command
///
/// Comparisons draw a fresh pair of labels from `naming`.
pub fn lower_arithmetic(naming: &mut NameGenerator, op: ArithmeticOp) -> Vec<AsmInst> {
    let mut insts = Vec::new();

    match op.shape() {
        Shape::Binary(comp) => {
            pop_to_d(&mut insts);
            insts.push(assign(Dest::A, Comp::AMinusOne));
            insts.push(assign(Dest::M, comp));
        }
        Shape::Unary(comp) => {
            top_to_a(&mut insts);
            insts.push(assign(Dest::M, comp));
        }
        Shape::Compare(jump) => lower_comparison(&mut insts, naming, jump),
    }

    trace!("{:?} lowered to {} instructions", op, insts.len());
    insts
}

/// Compare-and-branch template: true is -1 (all bits set), false is 0
fn lower_comparison(insts: &mut Vec<AsmInst>, naming: &mut NameGenerator, jump: Jump) {
    let labels = naming.compare_labels();

    pop_to_d(insts);
    insts.push(assign(Dest::A, Comp::AMinusOne));
    insts.push(assign(Dest::D, Comp::MMinusD));
    insts.push(AsmInst::at_label(&labels.on_true));
    insts.push(AsmInst::Branch(Comp::D, jump));

    top_to_a(insts);
    insts.push(assign(Dest::M, Comp::Zero));
    insts.push(AsmInst::at_label(&labels.finished));
    insts.push(AsmInst::jmp());

    insts.push(AsmInst::label(&labels.on_true));
    top_to_a(insts);
    insts.push(assign(Dest::M, Comp::NegOne));

    insts.push(AsmInst::label(&labels.finished));
}
