//! The target machine
//!
//! 32K words of RAM, a ROM of assembled ops, and the `A`, `D` and `PC`
//! registers. A program counts as halted once the PC reaches the
//! `@n` / `0;JMP` self-loop every translated program ends in.

use crate::assembler::{Op, Program};
use log::trace;
use thiserror::Error;
use vmt_codegen::{Comp, Dest};

/// Words of data memory
pub const RAM_SIZE: usize = 32768;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("pc {pc}: memory access at {address} is outside RAM")]
    AddressOutOfRange { pc: u16, address: u16 },
}

/// Execution states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Halted,
    Error(String),
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached a self-loop
    Halted,
    /// Ran past the last ROM word
    FellThrough,
    /// Still running after the cycle budget
    CycleLimit,
}

pub struct Machine {
    rom: Vec<Op>,
    ram: Vec<u16>,
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    pub cycles: u64,
    pub state: MachineState,
}

impl Machine {
    pub fn new(program: Program) -> Self {
        Self {
            rom: program.ops,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            cycles: 0,
            state: MachineState::Running,
        }
    }

    pub fn ram(&self) -> &[u16] {
        &self.ram
    }

    pub fn peek(&self, address: u16) -> u16 {
        self.ram[address as usize % RAM_SIZE]
    }

    /// Read a cell as a signed word
    pub fn peek_signed(&self, address: u16) -> i16 {
        self.peek(address) as i16
    }

    pub fn poke(&mut self, address: u16, value: u16) {
        self.ram[address as usize % RAM_SIZE] = value;
    }

    /// Whether the PC sits on an `@pc` / `0;JMP` pair
    pub fn at_halt_loop(&self) -> bool {
        let pc = self.pc as usize;
        matches!(self.rom.get(pc), Some(Op::Load(target)) if *target == self.pc)
            && self.rom.get(pc + 1).is_some_and(|op| op.is_unconditional_jump())
    }

    /// Execute one instruction
    pub fn step(&mut self) -> Result<(), MachineError> {
        let op = match self.rom.get(self.pc as usize) {
            Some(op) => *op,
            None => return Ok(()),
        };
        self.cycles += 1;

        match op {
            Op::Load(value) => {
                self.a = value;
                self.pc = self.pc.wrapping_add(1);
            }
            Op::Compute { dest, comp, jump } => {
                let m = if comp.reads_memory() { self.read(self.a)? } else { 0 };
                let value = eval(comp, self.a, self.d, m);
                let address = self.a;

                if let Some(dest) = dest {
                    self.write_dest(dest, address, value)?;
                }

                match jump {
                    Some(jump) if jump.taken(value as i16) => self.pc = address,
                    _ => self.pc = self.pc.wrapping_add(1),
                }
            }
        }
        Ok(())
    }

    /// Run until halted, off the end of ROM, or out of cycles
    pub fn run(&mut self, max_cycles: u64) -> Result<RunOutcome, MachineError> {
        let start = self.cycles;
        loop {
            if self.at_halt_loop() {
                self.state = MachineState::Halted;
                trace!("halted at pc {} after {} cycles", self.pc, self.cycles);
                return Ok(RunOutcome::Halted);
            }
            if self.pc as usize >= self.rom.len() {
                self.state = MachineState::Halted;
                return Ok(RunOutcome::FellThrough);
            }
            if self.cycles - start >= max_cycles {
                return Ok(RunOutcome::CycleLimit);
            }
            if let Err(err) = self.step() {
                self.state = MachineState::Error(err.to_string());
                return Err(err);
            }
        }
    }

    fn read(&self, address: u16) -> Result<u16, MachineError> {
        self.ram
            .get(address as usize)
            .copied()
            .ok_or(MachineError::AddressOutOfRange { pc: self.pc, address })
    }

    fn write_dest(&mut self, dest: Dest, address: u16, value: u16) -> Result<(), MachineError> {
        // M is written through the A value from before this instruction
        if dest.writes_m() {
            let pc = self.pc;
            let cell = self
                .ram
                .get_mut(address as usize)
                .ok_or(MachineError::AddressOutOfRange { pc, address })?;
            *cell = value;
        }
        if dest.writes_a() {
            self.a = value;
        }
        if dest.writes_d() {
            self.d = value;
        }
        Ok(())
    }
}

fn eval(comp: Comp, a: u16, d: u16, m: u16) -> u16 {
    match comp {
        Comp::Zero => 0,
        Comp::One => 1,
        Comp::NegOne => u16::MAX,
        Comp::D => d,
        Comp::A => a,
        Comp::M => m,
        Comp::NotD => !d,
        Comp::NotA => !a,
        Comp::NotM => !m,
        Comp::NegD => d.wrapping_neg(),
        Comp::NegA => a.wrapping_neg(),
        Comp::NegM => m.wrapping_neg(),
        Comp::DPlusOne => d.wrapping_add(1),
        Comp::APlusOne => a.wrapping_add(1),
        Comp::MPlusOne => m.wrapping_add(1),
        Comp::DMinusOne => d.wrapping_sub(1),
        Comp::AMinusOne => a.wrapping_sub(1),
        Comp::MMinusOne => m.wrapping_sub(1),
        Comp::DPlusA => d.wrapping_add(a),
        Comp::DPlusM => d.wrapping_add(m),
        Comp::DMinusA => d.wrapping_sub(a),
        Comp::DMinusM => d.wrapping_sub(m),
        Comp::AMinusD => a.wrapping_sub(d),
        Comp::MMinusD => m.wrapping_sub(d),
        Comp::DAndA => d & a,
        Comp::DAndM => d & m,
        Comp::DOrA => d | a,
        Comp::DOrM => d | m,
    }
}
