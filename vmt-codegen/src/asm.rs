//! Hack Assembly Instruction Definitions
//!
//! This module defines the instruction vocabulary and predefined symbols
//! of the 16-bit target machine. The machine has two registers, `A`
//! (address or data) and `D` (data), and `M` names the memory cell that
//! `A` currently points at.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing assembly mnemonics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAsmError {
    #[error("unknown destination '{0}'")]
    Dest(String),

    #[error("unknown computation '{0}'")]
    Comp(String),

    #[error("unknown jump condition '{0}'")]
    Jump(String),
}

/// Predefined symbolic addresses used by the translator
///
/// - SP: stack pointer
/// - LCL, ARG, THIS, THAT: segment base pointers
/// - R13, R14, R15: scratch cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Sp,
    Lcl,
    Arg,
    This,
    That,
    R13,
    R14,
    R15,
}

impl Reg {
    /// Memory address the symbol stands for
    pub const fn address(self) -> u16 {
        match self {
            Reg::Sp => 0,
            Reg::Lcl => 1,
            Reg::Arg => 2,
            Reg::This => 3,
            Reg::That => 4,
            Reg::R13 => 13,
            Reg::R14 => 14,
            Reg::R15 => 15,
        }
    }

    /// Reverse lookup, used to print well-known cells by name
    pub fn from_address(address: u16) -> Option<Reg> {
        [
            Reg::Sp,
            Reg::Lcl,
            Reg::Arg,
            Reg::This,
            Reg::That,
            Reg::R13,
            Reg::R14,
            Reg::R15,
        ]
        .into_iter()
        .find(|reg| reg.address() == address)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Reg::Sp => "SP",
            Reg::Lcl => "LCL",
            Reg::Arg => "ARG",
            Reg::This => "THIS",
            Reg::That => "THAT",
            Reg::R13 => "R13",
            Reg::R14 => "R14",
            Reg::R15 => "R15",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operand of an address load (`@value`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Const(u16),
    Reg(Reg),
    Label(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Const(value) => write!(f, "{}", value),
            Address::Reg(reg) => write!(f, "{}", reg),
            Address::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Destination of a computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dest {
    A,
    D,
    M,
    AM,
    AD,
    MD,
    AMD,
}

impl Dest {
    pub fn writes_a(self) -> bool {
        matches!(self, Dest::A | Dest::AM | Dest::AD | Dest::AMD)
    }

    pub fn writes_d(self) -> bool {
        matches!(self, Dest::D | Dest::AD | Dest::MD | Dest::AMD)
    }

    pub fn writes_m(self) -> bool {
        matches!(self, Dest::M | Dest::AM | Dest::MD | Dest::AMD)
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Dest::A => "A",
            Dest::D => "D",
            Dest::M => "M",
            Dest::AM => "AM",
            Dest::AD => "AD",
            Dest::MD => "MD",
            Dest::AMD => "AMD",
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl FromStr for Dest {
    type Err = ParseAsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Any ordering of the letters names the same destination set
        let mut letters: Vec<char> = s.chars().collect();
        letters.sort_unstable();
        letters.dedup();
        if letters.len() != s.len() {
            return Err(ParseAsmError::Dest(s.to_string()));
        }
        match letters.iter().collect::<String>().as_str() {
            "A" => Ok(Dest::A),
            "D" => Ok(Dest::D),
            "M" => Ok(Dest::M),
            "AM" => Ok(Dest::AM),
            "AD" => Ok(Dest::AD),
            "DM" => Ok(Dest::MD),
            "ADM" => Ok(Dest::AMD),
            _ => Err(ParseAsmError::Dest(s.to_string())),
        }
    }
}

/// ALU computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

/// Canonical spelling of every computation
const COMP_MNEMONICS: &[(Comp, &str)] = &[
    (Comp::Zero, "0"),
    (Comp::One, "1"),
    (Comp::NegOne, "-1"),
    (Comp::D, "D"),
    (Comp::A, "A"),
    (Comp::M, "M"),
    (Comp::NotD, "!D"),
    (Comp::NotA, "!A"),
    (Comp::NotM, "!M"),
    (Comp::NegD, "-D"),
    (Comp::NegA, "-A"),
    (Comp::NegM, "-M"),
    (Comp::DPlusOne, "D+1"),
    (Comp::APlusOne, "A+1"),
    (Comp::MPlusOne, "M+1"),
    (Comp::DMinusOne, "D-1"),
    (Comp::AMinusOne, "A-1"),
    (Comp::MMinusOne, "M-1"),
    (Comp::DPlusA, "D+A"),
    (Comp::DPlusM, "D+M"),
    (Comp::DMinusA, "D-A"),
    (Comp::DMinusM, "D-M"),
    (Comp::AMinusD, "A-D"),
    (Comp::MMinusD, "M-D"),
    (Comp::DAndA, "D&A"),
    (Comp::DAndM, "D&M"),
    (Comp::DOrA, "D|A"),
    (Comp::DOrM, "D|M"),
];

/// Commuted spellings accepted on input
const COMP_ALIASES: &[(Comp, &str)] = &[
    (Comp::DPlusOne, "1+D"),
    (Comp::APlusOne, "1+A"),
    (Comp::MPlusOne, "1+M"),
    (Comp::DPlusA, "A+D"),
    (Comp::DPlusM, "M+D"),
    (Comp::DAndA, "A&D"),
    (Comp::DAndM, "M&D"),
    (Comp::DOrA, "A|D"),
    (Comp::DOrM, "M|D"),
];

impl Comp {
    /// Whether the computation reads the memory cell at `A`
    pub fn reads_memory(self) -> bool {
        matches!(
            self,
            Comp::M
                | Comp::NotM
                | Comp::NegM
                | Comp::MPlusOne
                | Comp::MMinusOne
                | Comp::DPlusM
                | Comp::DMinusM
                | Comp::MMinusD
                | Comp::DAndM
                | Comp::DOrM
        )
    }

    fn mnemonic(self) -> &'static str {
        COMP_MNEMONICS
            .iter()
            .find(|(comp, _)| *comp == self)
            .map(|(_, text)| *text)
            .unwrap_or("?")
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

impl FromStr for Comp {
    type Err = ParseAsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        COMP_MNEMONICS
            .iter()
            .chain(COMP_ALIASES.iter())
            .find(|(_, text)| *text == compact)
            .map(|(comp, _)| *comp)
            .ok_or_else(|| ParseAsmError::Comp(s.to_string()))
    }
}

/// Jump condition, tested against the computation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Jump {
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    /// Whether the jump is taken for a given (signed) result
    pub fn taken(self, value: i16) -> bool {
        match self {
            Jump::JGT => value > 0,
            Jump::JEQ => value == 0,
            Jump::JGE => value >= 0,
            Jump::JLT => value < 0,
            Jump::JNE => value != 0,
            Jump::JLE => value <= 0,
            Jump::JMP => true,
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Jump::JGT => "JGT",
            Jump::JEQ => "JEQ",
            Jump::JGE => "JGE",
            Jump::JLT => "JLT",
            Jump::JNE => "JNE",
            Jump::JLE => "JLE",
            Jump::JMP => "JMP",
        };
        write!(f, "{}", text)
    }
}

impl FromStr for Jump {
    type Err = ParseAsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JGT" => Ok(Jump::JGT),
            "JEQ" => Ok(Jump::JEQ),
            "JGE" => Ok(Jump::JGE),
            "JLT" => Ok(Jump::JLT),
            "JNE" => Ok(Jump::JNE),
            "JLE" => Ok(Jump::JLE),
            "JMP" => Ok(Jump::JMP),
            _ => Err(ParseAsmError::Jump(s.to_string())),
        }
    }
}

/// Hack Assembly Instructions
///
/// One variant per line of output. `Label` and `Comment` are
/// pseudo-instructions that occupy no ROM word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInst {
    At(Address),          // @value
    Assign(Dest, Comp),   // dest=comp
    Branch(Comp, Jump),   // comp;jump
    Label(String),        // (label)
    Comment(String),      // // text
}

impl AsmInst {
    pub fn at_const(value: u16) -> Self {
        AsmInst::At(Address::Const(value))
    }

    pub fn at_reg(reg: Reg) -> Self {
        AsmInst::At(Address::Reg(reg))
    }

    pub fn at_label(label: &str) -> Self {
        AsmInst::At(Address::Label(label.to_string()))
    }

    pub fn label(name: &str) -> Self {
        AsmInst::Label(name.to_string())
    }

    /// Unconditional jump to the address currently in `A`
    pub fn jmp() -> Self {
        AsmInst::Branch(Comp::Zero, Jump::JMP)
    }

    /// Whether this line becomes a ROM word
    pub fn is_instruction(&self) -> bool {
        !matches!(self, AsmInst::Label(_) | AsmInst::Comment(_))
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::At(address) => write!(f, "@{}", address),
            AsmInst::Assign(dest, comp) => write!(f, "{}={}", dest, comp),
            AsmInst::Branch(comp, jump) => write!(f, "{};{}", comp, jump),
            AsmInst::Label(label) => write!(f, "({})", label),
            AsmInst::Comment(text) => write!(f, "// {}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Reg::Sp), "SP");
        assert_eq!(format!("{}", Reg::That), "THAT");
        assert_eq!(format!("{}", Reg::R14), "R14");
        assert_eq!(Reg::from_address(3), Some(Reg::This));
        assert_eq!(Reg::from_address(7), None);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(format!("{}", AsmInst::at_const(256)), "@256");
        assert_eq!(format!("{}", AsmInst::at_reg(Reg::Lcl)), "@LCL");
        assert_eq!(format!("{}", AsmInst::Assign(Dest::AM, Comp::MMinusOne)), "AM=M-1");
        assert_eq!(format!("{}", AsmInst::Branch(Comp::D, Jump::JNE)), "D;JNE");
        assert_eq!(format!("{}", AsmInst::jmp()), "0;JMP");
        assert_eq!(format!("{}", AsmInst::label("_END")), "(_END)");
        assert_eq!(format!("{}", AsmInst::Comment("push constant 7".to_string())), "// push constant 7");
    }

    #[test]
    fn test_comp_round_trips_through_text() {
        for (comp, text) in COMP_MNEMONICS {
            assert_eq!(comp.to_string(), *text);
            assert_eq!(text.parse::<Comp>(), Ok(*comp));
        }
    }

    #[test]
    fn test_comp_aliases() {
        assert_eq!("M+D".parse::<Comp>(), Ok(Comp::DPlusM));
        assert_eq!("A & D".parse::<Comp>(), Ok(Comp::DAndA));
        assert_eq!("M*D".parse::<Comp>(), Err(ParseAsmError::Comp("M*D".to_string())));
    }

    #[test]
    fn test_dest_parsing() {
        assert_eq!("AM".parse::<Dest>(), Ok(Dest::AM));
        assert_eq!("MD".parse::<Dest>(), Ok(Dest::MD));
        assert_eq!("DM".parse::<Dest>(), Ok(Dest::MD));
        assert_eq!("AMD".parse::<Dest>(), Ok(Dest::AMD));
        assert!("AA".parse::<Dest>().is_err());
        assert!("X".parse::<Dest>().is_err());
        assert!(Dest::AMD.writes_a() && Dest::AMD.writes_d() && Dest::AMD.writes_m());
        assert!(!Dest::AM.writes_d());
    }

    #[test]
    fn test_jump_conditions() {
        assert!(Jump::JEQ.taken(0));
        assert!(!Jump::JEQ.taken(1));
        assert!(Jump::JLT.taken(-1));
        assert!(Jump::JGE.taken(0));
        assert!(Jump::JMP.taken(12));
        assert_eq!("JLE".parse::<Jump>(), Ok(Jump::JLE));
    }

    #[test]
    fn test_memory_reads() {
        assert!(Comp::DPlusM.reads_memory());
        assert!(!Comp::DPlusA.reads_memory());
    }
}
