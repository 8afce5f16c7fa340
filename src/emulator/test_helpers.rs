//! Doubles wiring the emulator to scripted keyboard input and an in-memory
//! writer, so tests never touch the real terminal.
use crate::emulator::Emulator;
use crate::hardware::keyboard::ChannelInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{PC_START, Registers};
use std::io;
use std::io::Write;
use std::sync::mpsc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

pub struct FakeEmulator {
    inner: Emulator<StringWriter>,
    keyboard_input_sender: Option<mpsc::Sender<u8>>,
}
impl FakeEmulator {
    /// The given words land at 0x3000, where the PC starts.
    pub fn new(words: &[u16]) -> Self {
        let (sender, receiver) = mpsc::channel();
        let mut inner = Emulator::with_io(
            Box::new(ChannelInputProvider::new(receiver)),
            StringWriter::new(),
        );
        for (index, word) in words.iter().enumerate() {
            inner
                .memory
                .write(PC_START.wrapping_add(u16::try_from(index).unwrap()), *word);
        }
        Self {
            inner,
            keyboard_input_sender: Some(sender),
        }
    }
    pub fn add_stdin_input(&mut self, input: &[u8]) -> &mut Self {
        let sender = self
            .keyboard_input_sender
            .as_ref()
            .expect("stdin already closed");
        for byte in input {
            sender.send(*byte).expect("receiver alive");
        }
        self
    }
    /// Drops the sender so further reads see end of input.
    pub fn close_stdin(&mut self) -> &mut Self {
        self.keyboard_input_sender = None;
        self
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.inner.output,
        )
    }
    pub fn emulator(&mut self) -> &mut Emulator<StringWriter> {
        &mut self.inner
    }
    pub fn output_string(&self) -> String {
        self.inner.output.get_string()
    }
}
