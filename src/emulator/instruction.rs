use crate::numbers;
use std::fmt::{Debug, Formatter};

/// Wrapper for an LC-3 u16 instruction.
/// The top nibble is the opcode, the rest are operand fields whose layout
/// depends on it.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), must be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the mask covers at most 16 bits, the u32 shift only avoids overflow at width 16"
        )]
        let mask = ((1u32 << (to - from + 1)) - 1) as u16;
        (self.0 >> from) & mask
    }
    /// Gives the value of only the specified bit range and converts that to u8.
    /// See [`Instruction::get_bit_range()`]
    /// # Panics
    /// - value does not fit into u8 with message from `expect`
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8, expect: &str) -> u8 {
        u8::try_from(self.get_bit_range(from, to)).expect(expect)
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) != 0
    }
    #[must_use]
    pub fn op_code(self) -> u8 {
        self.get_bit_range_u8(12, 15, "Error parsing op_code")
    }
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11, "Error parsing dr")
    }
    /// Bits 11..9 name the source register for the store instructions.
    #[must_use]
    pub fn sr_number(self) -> u8 {
        self.dr_number()
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing sr1")
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2, "Error parsing sr2")
    }
    /// Bits 8..6 double as the base register of JMP, JSRR, LDR and STR.
    #[must_use]
    pub fn base_register_number(self) -> u8 {
        self.get_bit_range_u8(6, 8, "Error parsing base register")
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Offset to add to the program counter or a base register, sign
    /// extended from its `len` low bits to the full word.
    ///
    /// A `wrapping_add` of the result is the two's complement addition the
    /// architecture asks for, no signed types needed.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        numbers::sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// The branch condition mask, bits 11..9 interpreted as N, Z, P.
    #[must_use]
    pub fn nzp_mask(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    /// Bit 11 distinguishes JSR (PC-relative) from JSRR (base register).
    #[must_use]
    pub fn is_long_jump(self) -> bool {
        self.get_bit(11)
    }
    /// trapvect8, zero extended. All defined vectors have bit 7 clear, so
    /// this matches the sign extension the architecture nominally asks for.
    #[must_use]
    pub fn trap_vector(self) -> u16 {
        self.get_bit_range(0, 7)
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Op: {:04b}, DR: {:03b}, PC_Off: {:09b}",
            self.op_code(),
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

/// The 16 encodings of the opcode nibble.
///
/// RTI and RES decode like the rest; the executor rejects them as illegal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpCode {
    Br,
    Add,
    Ld,
    St,
    Jsr,
    And,
    Ldr,
    Str,
    Rti,
    Not,
    Ldi,
    Sti,
    Jmp,
    Res,
    Lea,
    Trap,
}

impl From<Instruction> for OpCode {
    fn from(instruction: Instruction) -> Self {
        match instruction.op_code() {
            0x0 => Self::Br,
            0x1 => Self::Add,
            0x2 => Self::Ld,
            0x3 => Self::St,
            0x4 => Self::Jsr,
            0x5 => Self::And,
            0x6 => Self::Ldr,
            0x7 => Self::Str,
            0x8 => Self::Rti,
            0x9 => Self::Not,
            0xA => Self::Ldi,
            0xB => Self::Sti,
            0xC => Self::Jmp,
            0xD => Self::Res,
            0xE => Self::Lea,
            0xF => Self::Trap,
            _ => unreachable!("op_code is a four bit field"),
        }
    }
}
