//! # LC-3 Emulator.
//!
//! `lc3-vm` emulates the LC-3, a 16-bit educational computer: the
//! fetch-decode-execute cycle over 65,536 words of memory, eight general
//! registers, one-hot condition flags, six host-level trap routines and a
//! memory-mapped keyboard.
//! Usage starts with loading an image via [`Emulator::load_image`] or
//! [`Emulator::load_image_file`], then calling [`Emulator::execute`].
//!
//! # Example
//! ```
//! use lc3_vm::emulator::Emulator;
//! use lc3_vm::hardware::keyboard::ChannelInputProvider;
//! use std::sync::mpsc;
//!
//! let (_keys, receiver) = mpsc::channel();
//! let mut emu = Emulator::with_io(Box::new(ChannelInputProvider::new(receiver)), Vec::new());
//! // .ORIG x3000 / HALT
//! emu.load_image(&[0x30, 0x00, 0xF0, 0x25])?;
//! emu.execute()?;
//! assert_eq!(emu.output().as_slice(), b"HALT\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//! # Errors
//! - Image is malformed (missing origin word, odd size, too long for its origin)
//! - Program executes a reserved opcode or an unknown trap vector
//! - Console I/O fails

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;

pub use emulator::Emulator;
