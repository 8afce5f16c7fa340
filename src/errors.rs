//! Errors that can occur using this crate.
//!
//! The crate's code is designed in a way that functions/method _can_ trigger all the enum variants
//! specified in the returned [`Result`]

use displaydoc::Display;
use std::error::Error;
use std::fmt::{self, Debug, Formatter};
use std::io;

/// Possible errors during image load.
///
/// Issues are malformed images or errors during attempts to read them.
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[expect(clippy::doc_markdown, reason = "using backticks as suggested would break displaydoc")]
#[derive(Display, PartialEq, Eq)]
pub enum LoadImageError {
    /// Image is missing its origin word
    ImageMissingOrigin,
    /// Images must be a whole number of 16-bit words, but {0} bytes were given
    ImageNotEvenSize(usize),
    /// Image does not fit into memory: {actual_words} words at origin {origin:#06X} exceed the {maximum_words} words above it
    ImageTooLong { origin: u16, actual_words: usize, maximum_words: usize },
    /// Cannot read image from file '{file}': {message}
    ImageNotLoadable {
        file: String,
        message: String
    },
}
impl Debug for LoadImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
impl Error for LoadImageError {}

/// Possible errors during program execution.
///
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[derive(Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// The reserved opcode {0:#06b} was found which is not specified. Most probably an invalid program.
    ReservedInstructionFound(u8),
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
    /// Unknown trap routine found: {0:#06X}
    UnknownTrapRoutine(u16),
}
impl Debug for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
impl Error for ExecutionError {}
impl From<io::Error> for ExecutionError {
    fn from(error: io::Error) -> Self {
        Self::IOInputOutputError(error.to_string())
    }
}

/// Top-level error type of the `lc3-vm` binary.
#[derive(Display, PartialEq, Eq)]
pub enum Lc3VmError {
    /// {0}
    Load(LoadImageError),
    /// {0}
    Execution(ExecutionError),
}
impl Debug for Lc3VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
impl Error for Lc3VmError {}
impl From<LoadImageError> for Lc3VmError {
    fn from(error: LoadImageError) -> Self {
        Self::Load(error)
    }
}
impl From<ExecutionError> for Lc3VmError {
    fn from(error: ExecutionError) -> Self {
        Self::Execution(error)
    }
}
