//! Segment table and address resolution
//!
//! Maps a VM segment name and index to the place the value lives on the
//! target machine. The table is fixed; the only mutable part is the
//! static allocator, which gives every module its own run of cells in
//! the static area.

use log::{trace, warn};
use vmt_codegen::{Address, Reg};
use vmt_common::VmError;

/// First RAM cell of the temp segment
pub const TEMP_BASE: u16 = 5;

/// First RAM cell of the static area
pub const STATIC_BASE: u16 = 16;

/// First RAM cell past the static area (the stack base)
pub const STATIC_LIMIT: u16 = 256;

/// Largest literal an address load can carry
pub const MAX_CONSTANT: u16 = 0x7FFF;

/// Where a segment's base comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// A predefined symbol
    Symbol(Reg),
    /// A numeric RAM address
    Fixed(u16),
    /// No memory behind the segment
    None,
}

/// How the base is turned into a cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// The base cell holds the address of the data
    Pointer,
    /// The base is the data address, the index is added arithmetically
    Direct,
}

/// What a push of the segment produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// The contents of a memory cell
    Memory,
    /// The index itself
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub name: &'static str,
    pub base: Base,
    pub addressing: AddressingMode,
    pub value: ValueMode,
    /// Indices are offset per module so modules never share cells
    pub per_module_unique: bool,
    /// Exclusive upper bound on the index
    pub limit: u16,
}

pub static SEGMENTS: [SegmentDescriptor; 8] = [
    SegmentDescriptor {
        name: "local",
        base: Base::Symbol(Reg::Lcl),
        addressing: AddressingMode::Pointer,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: MAX_CONSTANT + 1,
    },
    SegmentDescriptor {
        name: "argument",
        base: Base::Symbol(Reg::Arg),
        addressing: AddressingMode::Pointer,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: MAX_CONSTANT + 1,
    },
    SegmentDescriptor {
        name: "this",
        base: Base::Symbol(Reg::This),
        addressing: AddressingMode::Pointer,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: MAX_CONSTANT + 1,
    },
    SegmentDescriptor {
        name: "that",
        base: Base::Symbol(Reg::That),
        addressing: AddressingMode::Pointer,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: MAX_CONSTANT + 1,
    },
    SegmentDescriptor {
        name: "temp",
        base: Base::Fixed(TEMP_BASE),
        addressing: AddressingMode::Direct,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: 8,
    },
    SegmentDescriptor {
        name: "static",
        base: Base::Fixed(STATIC_BASE),
        addressing: AddressingMode::Direct,
        value: ValueMode::Memory,
        per_module_unique: true,
        limit: MAX_CONSTANT + 1,
    },
    SegmentDescriptor {
        name: "constant",
        base: Base::None,
        addressing: AddressingMode::Direct,
        value: ValueMode::Immediate,
        per_module_unique: false,
        limit: MAX_CONSTANT + 1,
    },
    // The THIS/THAT pointer cells themselves
    SegmentDescriptor {
        name: "pointer",
        base: Base::Symbol(Reg::This),
        addressing: AddressingMode::Direct,
        value: ValueMode::Memory,
        per_module_unique: false,
        limit: 2,
    },
];

/// Look a segment up by name, ignoring ASCII case
pub fn lookup(name: &str) -> Option<&'static SegmentDescriptor> {
    SEGMENTS.iter().find(|seg| seg.name.eq_ignore_ascii_case(name))
}

/// A resolved segment reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal value, no memory access
    Immediate(u16),
    /// `RAM[RAM[base]] + index`
    Pointer { base: Reg, index: u16 },
    /// A cell whose address is known at translation time
    Direct(Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub segment: &'static SegmentDescriptor,
    pub operand: Operand,
}

impl Resolved {
    pub fn addressing_mode(&self) -> AddressingMode {
        self.segment.addressing
    }

    pub fn value_mode(&self) -> ValueMode {
        self.segment.value
    }
}

/// Static cell bookkeeping for the whole run
///
/// `high_water_mark` tracks the highest static index + 1 used by the
/// current module; `offset` is the sum of every earlier module's mark.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticAllocator {
    high_water_mark: u16,
    offset: u16,
}

impl StaticAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire the current module's statics and start a fresh run
    pub fn switch_module(&mut self) {
        self.offset = self.offset.saturating_add(self.high_water_mark);
        self.high_water_mark = 0;
    }

    /// Record a use of `index` and return its run-wide slot
    pub fn allocate(&mut self, index: u16) -> u16 {
        self.high_water_mark = self.high_water_mark.max(index.saturating_add(1));
        self.offset.saturating_add(index)
    }

    /// Exclusive bound on the current module's indices, so that every
    /// static cell stays loadable as an address literal
    pub fn index_limit(&self) -> u16 {
        (MAX_CONSTANT + 1).saturating_sub(STATIC_BASE).saturating_sub(self.offset)
    }

    pub fn high_water_mark(&self) -> u16 {
        self.high_water_mark
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }
}

/// Resolves segment references against the fixed table
#[derive(Debug, Default)]
pub struct SegmentResolver {
    statics: StaticAllocator,
}

impl SegmentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statics(&self) -> &StaticAllocator {
        &self.statics
    }

    pub fn switch_module(&mut self) {
        self.statics.switch_module();
        trace!("static offset now {}", self.statics.offset());
    }

    pub fn resolve(&mut self, segment: &str, index: u16) -> Result<Resolved, VmError> {
        let descriptor = lookup(segment).ok_or_else(|| VmError::invalid_segment(segment))?;

        let limit = if descriptor.per_module_unique {
            descriptor.limit.min(self.statics.index_limit())
        } else {
            descriptor.limit
        };
        if index >= limit {
            return Err(VmError::SegmentIndexOutOfRange {
                segment: descriptor.name.to_string(),
                index,
                limit,
            });
        }

        let operand = match (descriptor.value, descriptor.addressing, descriptor.base) {
            (ValueMode::Immediate, _, _) => Operand::Immediate(index),
            (ValueMode::Memory, AddressingMode::Pointer, Base::Symbol(base)) => Operand::Pointer { base, index },
            (ValueMode::Memory, AddressingMode::Direct, base) => {
                let slot = if descriptor.per_module_unique {
                    self.statics.allocate(index)
                } else {
                    index
                };
                Operand::Direct(direct_address(descriptor, base, slot))
            }
            (ValueMode::Memory, AddressingMode::Pointer, _) => {
                return Err(VmError::invalid_segment(segment));
            }
        };

        trace!("resolved {} {} -> {:?}", descriptor.name, index, operand);
        Ok(Resolved {
            segment: descriptor,
            operand,
        })
    }
}

fn direct_address(descriptor: &SegmentDescriptor, base: Base, slot: u16) -> Address {
    match base {
        Base::Symbol(reg) => {
            let address = reg.address() + slot;
            Reg::from_address(address)
                .map(Address::Reg)
                .unwrap_or(Address::Const(address))
        }
        Base::Fixed(base) => {
            let address = base.saturating_add(slot);
            if descriptor.per_module_unique && address >= STATIC_LIMIT {
                warn!("static cell {} runs into the stack area", address);
            }
            Address::Const(address)
        }
        Base::None => Address::Const(slot),
    }
}
