//! Implemented operations for the LC 3.
//!
//! All arithmetic is modulo 2^16 on the raw bit pattern; overflow is silent
//! and sign only exists at the flag update.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use log::debug;

/// ADD: Mathematical addition in 2 variants
/// - DR is set with result of SR 1 + SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0001 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 + sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0001 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn add(i: Instruction, r: &mut Registers) {
    let operand = if i.is_immediate() {
        i.get_immediate()
    } else {
        r.get(i.sr2_number()).as_binary()
    };
    let result = r.get(i.sr1_number()).as_binary().wrapping_add(operand);
    debug!("ADD r{} = {result:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(result));
    r.update_condition(i.dr_number());
}

/// AND: bit-wise AND in 2 variants
/// - DR is set with result of SR 1 AND SR 2
/// ```text
///  15__12__11_9__8_6___5___4_3__2_0_
/// | 0101 |  DR | SR1 | 0 | 00 | SR2 |
///  ---------------------------------
/// ```
/// - DR is set with result of SR 1 AND sign extended immediate
/// ```text
///  15__12__11_9__8_6___5___4___0_
/// | 0101 |  DR | SR1 | 1 |  IMM5 |
///  ------------------------------
/// ```
pub fn and(i: Instruction, r: &mut Registers) {
    let operand = if i.is_immediate() {
        i.get_immediate()
    } else {
        r.get(i.sr2_number()).as_binary()
    };
    let result = r.get(i.sr1_number()).as_binary() & operand;
    debug!("AND r{} = {result:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(result));
    r.update_condition(i.dr_number());
}

/// NOT: bit-wise complement of the value in SR 1
/// ```text
///  15__12__11_9__8_6___5___0_
/// | 1001 |  DR | SR1 | 11111 |
///  --------------------------
/// ```
pub fn not(i: Instruction, r: &mut Registers) {
    let result = !r.get(i.sr1_number()).as_binary();
    debug!("NOT r{} = {result:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(result));
    r.update_condition(i.dr_number());
}

/// BR: Conditional Branch
/// Adds the sign extended offset to PC if the condition flag matches one of
/// the set `n`, `z`, `p` bits. An all-zero mask never branches, an all-one
/// mask always does.
/// ```text
///  15__12__11_9___8_______0_
/// | 0000 |  nzp | PCoffset9 |
///  -------------------------
/// ```
/// See [`crate::hardware::registers::ConditionFlag`]
pub fn br(i: Instruction, r: &mut Registers) {
    if i.nzp_mask() & r.condition().mask() != 0 {
        let target = r.pc().wrapping_add(i.pc_offset(9));
        debug!("BR taken to {target:#06X}");
        r.set_pc(target);
    }
}

/// JMP: Unconditional jump to the address in the base register.
/// RET is the special case with base register 7.
/// ```text
///  15__12__11_9__8___6___5______0_
/// | 1100 | 000 | BaseR | 000000  |
///  -------------------------------
/// ```
pub fn jmp(i: Instruction, r: &mut Registers) {
    let target = r.get(i.base_register_number()).as_binary();
    debug!("JMP to {target:#06X}");
    r.set_pc(target);
}

/// JSR / JSRR: Jump to subroutine.
/// The PC of the following instruction is saved in R7, then the PC becomes
/// either PC + sign extended offset (bit 11 set) or the base register value.
/// ```text
///  15__12__11___10________0_
/// | 0100 |  1 | PCoffset11 |
///  -------------------------
///  15__12__11__10_9__8___6___5_____0_
/// | 0100 |  0 | 00 | BaseR | 000000 |
///  ----------------------------------
/// ```
pub fn jsr(i: Instruction, r: &mut Registers) {
    r.set(7, from_binary(r.pc()));
    let target = if i.is_long_jump() {
        r.pc().wrapping_add(i.pc_offset(11))
    } else {
        r.get(i.base_register_number()).as_binary()
    };
    debug!("JSR to {target:#06X}, return {:#06X}", r.pc());
    r.set_pc(target);
}

/// LD: Loads content of memory address of PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 0010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
/// # Errors
/// - the keyboard poll failed while the load addressed the status register
pub fn ld(i: Instruction, r: &mut Registers, memory: &mut Memory) -> Result<(), ExecutionError> {
    let value = memory.read(r.pc().wrapping_add(i.pc_offset(9)))?;
    debug!("LD r{} = {value:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(value));
    r.update_condition(i.dr_number());
    Ok(())
}

/// LDI: Load indirect.
/// Calculates memory address of PC + sign extended offset and reads another
/// address from there, the content of the memory at that indirectly loaded
/// address is put into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1010 |  DR  | PCoffset9 |
///  -------------------------
/// ```
/// # Errors
/// - the keyboard poll failed while a load addressed the status register
pub fn ldi(i: Instruction, r: &mut Registers, memory: &mut Memory) -> Result<(), ExecutionError> {
    let value_address = memory.read(r.pc().wrapping_add(i.pc_offset(9)))?;
    let value = memory.read(value_address)?;
    debug!("LDI r{} = {value:#06X} via {value_address:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(value));
    r.update_condition(i.dr_number());
    Ok(())
}

/// LDR: Load address from base register and adds sign extended offset to
/// load the memory content from there into DR.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0110 |  DR | BaseR | offset6 |
///  ------------------------------
/// ```
/// # Errors
/// - the keyboard poll failed while the load addressed the status register
pub fn ldr(i: Instruction, r: &mut Registers, memory: &mut Memory) -> Result<(), ExecutionError> {
    let base = r.get(i.base_register_number()).as_binary();
    let value = memory.read(base.wrapping_add(i.pc_offset(6)))?;
    debug!("LDR r{} = {value:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(value));
    r.update_condition(i.dr_number());
    Ok(())
}

/// LEA: Load Effective Address loads PC + sign extended offset into DR.
/// ```text
///  15__12__11_9___8_______0_
/// | 1110 |  DR  | PCoffset9 |
///  -------------------------
/// ```
pub fn lea(i: Instruction, r: &mut Registers) {
    let address = r.pc().wrapping_add(i.pc_offset(9));
    debug!("LEA r{} = {address:#06X}", i.dr_number());
    r.set(i.dr_number(), from_binary(address));
    r.update_condition(i.dr_number());
}

/// ST: Store. The contents of the SR are written to memory address
/// PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 0011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
pub fn st(i: Instruction, r: &Registers, memory: &mut Memory) {
    let address = r.pc().wrapping_add(i.pc_offset(9));
    debug!("ST {address:#06X} = r{}", i.sr_number());
    memory.write(address, r.get(i.sr_number()).as_binary());
}

/// STI: Store Indirect. The contents of the SR are written to the address
/// which is loaded from memory address PC + sign extended offset.
/// ```text
///  15__12__11_9___8_______0_
/// | 1011 |  SR  | PCoffset9 |
///  -------------------------
/// ```
/// # Errors
/// - the keyboard poll failed while the pointer load addressed the status register
pub fn sti(i: Instruction, r: &Registers, memory: &mut Memory) -> Result<(), ExecutionError> {
    let address = memory.read(r.pc().wrapping_add(i.pc_offset(9)))?;
    debug!("STI {address:#06X} = r{}", i.sr_number());
    memory.write(address, r.get(i.sr_number()).as_binary());
    Ok(())
}

/// STR: Store contents of SR to memory address of base register plus sign
/// extended offset.
/// ```text
///  15__12__11_9__8___6____5____0_
/// | 0111 |  SR | BaseR | offset6 |
///  ------------------------------
/// ```
pub fn str(i: Instruction, r: &Registers, memory: &mut Memory) {
    let address = r.get(i.base_register_number()).as_binary().wrapping_add(i.pc_offset(6));
    debug!("STR {address:#06X} = r{}", i.sr_number());
    memory.write(address, r.get(i.sr_number()).as_binary());
}

#[expect(clippy::unusual_byte_groupings, reason = "groups follow the instruction fields")]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::keyboard::ChannelInputProvider;
    use crate::hardware::registers::{ConditionFlag, from_decimal};
    use googletest::prelude::*;
    use std::sync::mpsc;

    fn memory_with_words(origin: u16, words: &[u16]) -> Memory {
        let (_sender, receiver) = mpsc::channel();
        let mut memory = Memory::new(Box::new(ChannelInputProvider::new(receiver)));
        for (index, word) in words.iter().enumerate() {
            memory.write(origin.wrapping_add(u16::try_from(index).unwrap()), *word);
        }
        memory
    }

    #[gtest]
    pub fn test_opcode_add() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(22));
        regs.set(1, from_binary(128));
        // Add: DR: 2, SR1: 0: 22, Immediate: false, SR2: 1: 128 => R2: 150
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        // Add: DR: 3, SR1: 2: 150, Immediate: true, imm5: 14 => R3: 164
        add(0b0001_011_010_1_01110.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(22)));
        expect_that!(regs.get(1), eq(from_binary(128)));
        expect_that!(regs.get(2), eq(from_binary(150)));
        expect_that!(regs.get(3), eq(from_binary(164)));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_add_negative() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(22));
        regs.set(1, from_decimal(-128));
        // Add: DR: 2, SR1: 0: 22, Immediate: false, SR2: 1: -128 => R2: -106
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        // Add: DR: 3, SR1: 2: -106, Immediate: true, imm5: -2 => R3: -108
        add(0b0001_011_010_1_11110.into(), &mut regs);
        expect_that!(regs.get(1), eq(from_binary(0b1111_1111_1000_0000)));
        expect_that!(regs.get(2).as_decimal(), eq(-106));
        expect_that!(regs.get(3).as_decimal(), eq(-108));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_add_wraps_into_sign() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0x7FFF)); // largest positive number in 2's complement
        regs.set(1, from_binary(1));
        // Add: DR: 2, SR1: 0, Immediate: false, SR2: 1 => R2: 0x8000
        add(0b0001_010_000_0_00_001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0x8000)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_add_wraps_to_zero() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0xFFFF)); // -1
        regs.set(2, from_binary(1)); // to be sure opcode was executed
        // Add: DR: 2, SR1: 0, Immediate: true, imm5: 1 => R2: 0
        add(0b0001_010_000_1_00001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0)));
        expect_that!(regs.condition(), eq(ConditionFlag::Zero));
    }

    #[gtest]
    pub fn test_opcode_and() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0b1101_1001_0111_0101));
        regs.set(1, from_binary(0b0100_1010_0010_1001));
        // And: DR: 2, SR1: 0, Immediate: false, SR2: 1
        and(0b0101_010_000_0_00_001.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0b0100_1000_0010_0001)));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_and_immediate() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0b1101_1001_0111_0101));
        // And: DR: 2, SR1: 0, Immediate: true, imm5: -11 sign extended to 0xFFF5
        and(0b0101_010_000_1_10101.into(), &mut regs);
        expect_that!(regs.get(2), eq(from_binary(0b1101_1001_0111_0101)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_not() {
        let mut regs = Registers::new();
        regs.set(0, from_binary(0x7FFF));
        // Not: DR: 1, SR1: 0 => R1: 0x8000
        super::not(0b1001_001_000_111111.into(), &mut regs);
        expect_that!(regs.get(0), eq(from_binary(0x7FFF)));
        expect_that!(regs.get(1), eq(from_binary(0x8000)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_not_zero() {
        let mut regs = Registers::new();
        // Not: DR: 1, SR1: 1 => R1: 0xFFFF
        super::not(0b1001_001_001_111111.into(), &mut regs);
        expect_that!(regs.get(1), eq(from_binary(0xFFFF)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_br_matching_mask_is_taken() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set_condition(ConditionFlag::Zero);
        // BRz #+3
        br(0b0000_010_000000011.into(), &mut regs);
        expect_that!(regs.pc(), eq(0x3004));
    }

    #[gtest]
    pub fn test_opcode_br_mismatching_mask_is_not_taken() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set_condition(ConditionFlag::Pos);
        // BRn #+3
        br(0b0000_100_000000011.into(), &mut regs);
        expect_that!(regs.pc(), eq(0x3001));
    }

    #[gtest]
    pub fn test_opcode_br_mask_extremes() {
        for flag in [ConditionFlag::Neg, ConditionFlag::Zero, ConditionFlag::Pos] {
            let mut regs = Registers::new();
            regs.set_pc(0x3001);
            regs.set_condition(flag);
            // BRnzp always branches
            br(0b0000_111_000000010.into(), &mut regs);
            expect_that!(regs.pc(), eq(0x3003));
            // an all-zero mask never does
            br(0b0000_000_000000010.into(), &mut regs);
            expect_that!(regs.pc(), eq(0x3003));
        }
    }

    #[gtest]
    pub fn test_opcode_br_negative_offset() {
        let mut regs = Registers::new();
        regs.set_pc(0x3002);
        regs.set_condition(ConditionFlag::Neg);
        // BRn #-2
        br(0b0000_100_111111110.into(), &mut regs);
        expect_that!(regs.pc(), eq(0x3000));
    }

    #[gtest]
    pub fn test_opcode_jmp_and_ret() {
        let mut regs = Registers::new();
        regs.set(3, from_binary(0x4242));
        // JMP R3
        jmp(0b1100_000_011_000000.into(), &mut regs);
        expect_that!(regs.pc(), eq(0x4242));

        regs.set(7, from_binary(0x3001));
        // RET is JMP R7
        jmp(0b1100_000_111_000000.into(), &mut regs);
        expect_that!(regs.pc(), eq(0x3001));
    }

    #[gtest]
    pub fn test_opcode_jsr_saves_return_address() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        // JSR #+2
        jsr(0b0100_1_00000000010.into(), &mut regs);
        expect_that!(regs.get(7), eq(from_binary(0x3001)));
        expect_that!(regs.pc(), eq(0x3003));
    }

    #[gtest]
    pub fn test_opcode_jsrr_uses_base_register() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(2, from_binary(0x5000));
        // JSRR R2
        jsr(0b0100_0_00_010_000000.into(), &mut regs);
        expect_that!(regs.get(7), eq(from_binary(0x3001)));
        expect_that!(regs.pc(), eq(0x5000));
    }

    #[gtest]
    pub fn test_opcode_ld() {
        let mut regs = Registers::new();
        regs.set_pc(0x3045);
        let mut memory = memory_with_words(0x3000, &[4711, 815]);
        // LD - DR: 4, PCoffset9: -0x44
        ld(0b0010_100_1_1011_1100.into(), &mut regs, &mut memory).unwrap();
        expect_that!(regs.get(4), eq(815u16));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));

        // LD - DR: 4, PCoffset9: -0x45
        ld(0b0010_100_1_1011_1011.into(), &mut regs, &mut memory).unwrap();
        expect_that!(regs.get(4), eq(4711u16));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_ldr() {
        let mut regs = Registers::new();
        let mem_val = 0b1111_1111_1111_0110; // -10
        let mut memory = memory_with_words(0x3005, &[mem_val]);
        regs.set(6, from_binary(0x3025));
        // LDR - DR: 2, BaseR: 6, offset6: -32 = -0x20
        ldr(0b0110_010_110_100000.into(), &mut regs, &mut memory).unwrap();
        expect_that!(regs.get(2), eq(from_binary(mem_val)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_ldi() {
        let mut regs = Registers::new();
        let val_to_load = 0b1111_1111_1111_0110; // -10
        let mut memory = memory_with_words(0x3003, &[val_to_load, 0, 0x3003]);
        regs.set_pc(0x3065);
        // LDI - DR: 1, PCoffset9: -96 = -0x60, pointer at 0x3005
        ldi(0b1010_001_110100000.into(), &mut regs, &mut memory).unwrap();
        expect_that!(regs.get(1), eq(from_binary(val_to_load)));
        expect_that!(regs.condition(), eq(ConditionFlag::Neg));
    }

    #[gtest]
    pub fn test_opcode_lea() {
        let mut regs = Registers::new();
        regs.set_pc(0x3045);
        // Lea: DR: 3, PCoffset9: 0x55
        lea(0b1110_011_0_0101_0101.into(), &mut regs);
        expect_that!(regs.get(3), eq(from_binary(0x3045 + 0b0_0101_0101)));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));
    }

    #[gtest]
    pub fn test_opcode_st() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(5, from_binary(0xBEEF));
        let mut memory = memory_with_words(0x3000, &[]);
        // ST - SR: 5, PCoffset9: +4
        st(0b0011_101_000000100.into(), &regs, &mut memory);
        expect_that!(memory[0x3005], eq(0xBEEF));
    }

    #[gtest]
    pub fn test_opcode_sti() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(5, from_binary(0xBEEF));
        // pointer 0x4000 sits at PC + 4
        let mut memory = memory_with_words(0x3005, &[0x4000]);
        // STI - SR: 5, PCoffset9: +4
        sti(0b1011_101_000000100.into(), &regs, &mut memory).unwrap();
        expect_that!(memory[0x4000], eq(0xBEEF));
        expect_that!(memory[0x3005], eq(0x4000));
    }

    #[gtest]
    pub fn test_opcode_str() {
        let mut regs = Registers::new();
        regs.set(1, from_binary(0x3010));
        regs.set(0, from_binary(42));
        let mut memory = memory_with_words(0x3000, &[]);
        // STR - SR: 0, BaseR: 1, offset6: -1
        str(0b0111_000_001_111111.into(), &regs, &mut memory);
        expect_that!(memory[0x300F], eq(42));
    }

    #[gtest]
    pub fn test_store_then_load_roundtrip() {
        let mut regs = Registers::new();
        regs.set_pc(0x3001);
        regs.set(5, from_binary(77));
        let mut memory = memory_with_words(0x3000, &[]);
        // ST - SR: 5, PCoffset9: +2
        st(0b0011_101_000000010.into(), &regs, &mut memory);
        // LD - DR: 6, PCoffset9: +2
        ld(0b0010_110_000000010.into(), &mut regs, &mut memory).unwrap();
        expect_that!(regs.get(6), eq(77u16));
        expect_that!(regs.condition(), eq(ConditionFlag::Pos));
    }
}
