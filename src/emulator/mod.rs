//! The emulator aggregate and its fetch-decode-execute loop.
use crate::emulator::instruction::{Instruction, OpCode};
use crate::emulator::trap_routines::TrapVector;
use crate::errors::{ExecutionError, LoadImageError};
use crate::hardware::keyboard::{KeyboardInputProvider, TerminalInputProvider};
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use log::{debug, info};
use std::fs;
use std::io::{Stdout, Write, stdout};
use std::ops::ControlFlow;
use std::path::Path;

pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub mod test_helpers;
pub mod trap_routines;

/// The public facing emulator used to run LC-3 programs.
///
/// Owns the whole architectural state: register file, memory with the
/// keyboard device behind it, the running flag and the output writer. There
/// are no globals; create one, load images, call [`Emulator::execute`].
pub struct Emulator<W: Write> {
    pub(crate) registers: Registers,
    pub(crate) memory: Memory,
    pub(crate) output: W,
    running: bool,
}

impl Emulator<Stdout> {
    /// An emulator wired to the controlling terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(Box::new(TerminalInputProvider::new()), stdout())
    }
}
impl Default for Emulator<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Emulator<W> {
    /// An emulator over an arbitrary key source and output sink, for tests
    /// and embedding.
    pub fn with_io(keyboard: Box<dyn KeyboardInputProvider>, output: W) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(keyboard),
            output,
            running: true,
        }
    }

    /// Loads a big-endian image (origin word first) into memory and returns
    /// the origin. May be called multiple times before execution.
    ///
    /// # Errors
    /// - Image is missing its origin word
    /// - Image is not a whole number of words
    /// - Image does not fit into the memory above its origin
    pub fn load_image(&mut self, image: &[u8]) -> Result<u16, LoadImageError> {
        let origin = self.memory.load_image(image)?;
        info!("loaded {} words at {origin:#06X}", image.len() / 2 - 1);
        Ok(origin)
    }

    /// Reads an image file and loads it via [`Emulator::load_image`].
    ///
    /// # Errors
    /// - the file cannot be read, or its content is rejected by the loader
    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<u16, LoadImageError> {
        let path = path.as_ref();
        let image = fs::read(path).map_err(|error| LoadImageError::ImageNotLoadable {
            file: path.display().to_string(),
            message: error.to_string(),
        })?;
        self.load_image(&image)
    }

    /// Runs the fetch-decode-execute loop until the HALT trap clears the
    /// running flag.
    ///
    /// # Errors
    /// - a reserved opcode or unknown trap vector was fetched
    /// - console I/O failed
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        while self.running {
            self.step()?;
        }
        Ok(())
    }

    /// One fetch-decode-execute cycle.
    ///
    /// The PC is incremented at fetch time, so every PC-relative operand is
    /// measured from the following instruction.
    ///
    /// # Errors
    /// - see [`Emulator::execute`]
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        let bits = self.memory.read(self.registers.pc())?;
        self.registers.inc_pc();
        let instruction = Instruction::from(bits);
        match OpCode::from(instruction) {
            OpCode::Br => opcodes::br(instruction, &mut self.registers),
            OpCode::Add => opcodes::add(instruction, &mut self.registers),
            OpCode::Ld => opcodes::ld(instruction, &mut self.registers, &mut self.memory)?,
            OpCode::St => opcodes::st(instruction, &self.registers, &mut self.memory),
            OpCode::Jsr => opcodes::jsr(instruction, &mut self.registers),
            OpCode::And => opcodes::and(instruction, &mut self.registers),
            OpCode::Ldr => opcodes::ldr(instruction, &mut self.registers, &mut self.memory)?,
            OpCode::Str => opcodes::str(instruction, &self.registers, &mut self.memory),
            OpCode::Not => opcodes::not(instruction, &mut self.registers),
            OpCode::Ldi => opcodes::ldi(instruction, &mut self.registers, &mut self.memory)?,
            OpCode::Sti => opcodes::sti(instruction, &self.registers, &mut self.memory)?,
            OpCode::Jmp => opcodes::jmp(instruction, &mut self.registers),
            OpCode::Lea => opcodes::lea(instruction, &mut self.registers),
            OpCode::Trap => self.trap(instruction)?,
            OpCode::Rti | OpCode::Res => {
                return Err(ExecutionError::ReservedInstructionFound(
                    instruction.op_code(),
                ));
            }
        }
        Ok(())
    }

    /// TRAP: saves the return PC in R7 and runs the routine in host code.
    /// The PC is not diverted, execution continues after the TRAP.
    fn trap(&mut self, instruction: Instruction) -> Result<(), ExecutionError> {
        self.registers.set(7, from_binary(self.registers.pc()));
        let vector = TrapVector::try_from(instruction.trap_vector())?;
        debug!("TRAP {vector:?}");
        let flow = match vector {
            TrapVector::GetC => trap_routines::get_c(&mut self.registers, &mut self.memory),
            TrapVector::Out => trap_routines::out(&self.registers, &mut self.output),
            TrapVector::PutS => {
                trap_routines::put_s(&self.registers, &self.memory, &mut self.output)
            }
            TrapVector::In => {
                trap_routines::in_trap(&mut self.registers, &mut self.memory, &mut self.output)
            }
            TrapVector::PutSp => {
                trap_routines::put_sp(&self.registers, &self.memory, &mut self.output)
            }
            TrapVector::Halt => trap_routines::halt(&mut self.output),
        };
        match flow {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(Ok(())) => {
                self.running = false;
                Ok(())
            }
            ControlFlow::Break(Err(error)) => Err(error),
        }
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }
    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }
    #[must_use]
    pub fn output(&self) -> &W {
        &self.output
    }
    /// False once the HALT trap has fired.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}
