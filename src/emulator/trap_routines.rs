//! This code does emulate the trap routines but does not implement them via the opcodes of the LC3
//! but directly.
//!
//! In the real system the code for these routines is at the target of the
//! [Trap Vector Tables](https://cs131.info/Assembly/Instructions/TRAPRoutines.html#trap-vector-table).
//! Here every vector maps to a host function; R7 still receives the return
//! address, but the PC is never diverted and simply continues after the TRAP
//! instruction.
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use crate::terminal;
use log::info;
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

/// The six implemented service routines, selected by the trapvect8 field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    /// Read one key into R0, no echo.
    GetC = 0x20,
    /// Write the character in R0.
    Out = 0x21,
    /// Write a one-character-per-word string.
    PutS = 0x22,
    /// Prompt, read one key into R0, echo it.
    In = 0x23,
    /// Write a packed two-characters-per-word string.
    PutSp = 0x24,
    /// Stop the fetch loop.
    Halt = 0x25,
}

impl TryFrom<u16> for TrapVector {
    type Error = ExecutionError;

    fn try_from(vector: u16) -> Result<Self, Self::Error> {
        match vector {
            0x20 => Ok(Self::GetC),
            0x21 => Ok(Self::Out),
            0x22 => Ok(Self::PutS),
            0x23 => Ok(Self::In),
            0x24 => Ok(Self::PutSp),
            0x25 => Ok(Self::Halt),
            unknown => Err(ExecutionError::UnknownTrapRoutine(unknown)),
        }
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    memory: &mut Memory,
) -> ControlFlow<Result<(), ExecutionError>> {
    match memory.wait_key() {
        Ok(key) => {
            regs.set(0, from_binary(key));
            ControlFlow::Continue(())
        }
        Err(error) => ControlFlow::Break(Err(error)),
    }
}

/// IN: Print a prompt on the screen and read a single character echoed back to the console.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_str_out("Enter a character: ", stdout)?;
    let key = match memory.wait_key() {
        Ok(key) => key,
        Err(error) => return ControlFlow::Break(Err(error)),
    };
    regs.set(0, from_binary(key));
    #[expect(
        clippy::cast_possible_truncation,
        reason = "keys arrive as single bytes, the high byte is zero"
    )]
    let echo = (key as u8) as char;
    write_str_out(&String::from(echo), stdout)
}

/// OUT: Write a character in R0\[7:0\] to the console display.
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "only the low byte of R0 is the character"
    )]
    let c = (regs.get(0).as_binary() & 0xFF) as u8 as char;
    write_str_out(&String::from(c), stdout)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Truncation is what is expected here"
)]
fn put_one_char_per_u16(word: u16, append_to: &mut String) -> ControlFlow<()> {
    append_to.push((word as u8) as char);
    ControlFlow::Continue(())
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Truncation is what is expected here"
)]
fn put_two_chars_per_u16(word: u16, append_to: &mut String) -> ControlFlow<()> {
    append_to.push((word as u8) as char);
    let high = (word >> 8) as u8;
    if high == 0 {
        // the terminator may sit in the high byte slot
        return ControlFlow::Break(());
    }
    append_to.push(high as char);
    ControlFlow::Continue(())
}

fn put(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
    handle_word: fn(u16, &mut String) -> ControlFlow<()>,
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut s = String::with_capacity(120);
    while mem[address] != 0 {
        if handle_word(mem[address], &mut s).is_break() {
            break;
        }
        address = address.wrapping_add(1);
    }
    write_str_out(s.as_str(), stdout)
}

/// PUTS: print the zero-terminated string starting at the address in R0,
/// one character per word.
pub fn put_s(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_one_char_per_u16)
}

/// PUTSP: Packed version of PUTS.
///
/// The ASCII code contained in bits \[7:0\] of a memory location is written to the console first,
/// then bits \[15:8\] unless they are zero. Writing terminates with a 0x0000
/// word or a zero high byte.
pub fn put_sp(
    regs: &Registers,
    mem: &Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, stdout, put_two_chars_per_u16)
}

/// HALT: End program and stdout a message
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    info!("guest program halted");
    write_str_out("HALT\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_str_out(
    message: &str,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match terminal::print(stdout, message) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, ()> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
