//! The architectural state: memory with its keyboard device, and registers.

pub mod keyboard;
pub mod memory;
pub mod registers;

pub use keyboard::KeyboardInputProvider;
pub use memory::Memory;
pub use registers::Registers;
