use crossterm::event::{Event, KeyCode, poll, read};
use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

/// Source of guest keyboard input.
///
/// `poll_key` is the zero-timeout readiness test behind the keyboard status
/// register, `read_key` blocks for the next key. Neither echoes; echoing is
/// the IN trap's business.
pub trait KeyboardInputProvider {
    /// # Errors
    /// - the underlying event source failed
    fn poll_key(&mut self) -> io::Result<bool>;
    /// # Errors
    /// - the underlying event source failed or reached its end
    fn read_key(&mut self) -> io::Result<u8>;
}

/// Keyboard input taken from the controlling terminal via crossterm events.
pub struct TerminalInputProvider {
    /// A key already consumed from the event queue by a poll.
    pending: Option<u8>,
}
impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    fn key_byte(event: &Event) -> Option<u8> {
        let key = event.as_key_event()?;
        match key.code {
            KeyCode::Enter => Some(b'\n'),
            KeyCode::Tab => Some(b'\t'),
            KeyCode::Backspace => Some(0x08),
            code => code.as_char().and_then(|c| u8::try_from(c).ok()),
        }
    }
}
impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}
impl KeyboardInputProvider for TerminalInputProvider {
    fn poll_key(&mut self) -> io::Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        // drain pending events so a resize does not read as a ready key
        while poll(Duration::ZERO)? {
            if let Some(byte) = Self::key_byte(&read()?) {
                self.pending = Some(byte);
                return Ok(true);
            }
        }
        Ok(false)
    }
    fn read_key(&mut self) -> io::Result<u8> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }
        loop {
            if let Some(byte) = Self::key_byte(&read()?) {
                return Ok(byte);
            }
        }
    }
}

/// Keyboard input scripted through an [`std::sync::mpsc`] channel.
///
/// Lets tests and embedders feed keys without a terminal: send bytes on the
/// paired `Sender`, drop it to signal end of input.
pub struct ChannelInputProvider {
    receiver: Receiver<u8>,
    pending: Option<u8>,
}
impl ChannelInputProvider {
    #[must_use]
    pub fn new(receiver: Receiver<u8>) -> Self {
        Self {
            receiver,
            pending: None,
        }
    }
}
impl KeyboardInputProvider for ChannelInputProvider {
    fn poll_key(&mut self) -> io::Result<bool> {
        if self.pending.is_none() {
            match self.receiver.try_recv() {
                Ok(byte) => self.pending = Some(byte),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }
        }
        Ok(self.pending.is_some())
    }
    fn read_key(&mut self) -> io::Result<u8> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }
        self.receiver.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "keyboard input channel closed")
        })
    }
}
