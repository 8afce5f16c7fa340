use std::io::{Write, stdin};
use std::os::fd::{AsRawFd, RawFd};
use termios::{ECHO, ICANON, TCSANOW, Termios, tcsetattr};

/// Guard restoring the terminal attributes saved at construction time.
pub struct RawLock {
    fd: RawFd,
    termios_orig: Termios,
}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays non-canonical on failure but no means to repair
        let _ = tcsetattr(self.fd, TCSANOW, &self.termios_orig);
    }
}

/// Turns off canonical input and echo so single keystrokes reach the VM
/// immediately, the way the keyboard status register expects them.
///
/// Output processing is left untouched, guest programs print through the
/// regular cooked stdout.
///
/// # Errors
/// - stdin is not a terminal or its attributes cannot be changed
pub fn disable_input_buffering() -> Result<RawLock, std::io::Error> {
    let fd = stdin().as_raw_fd();
    let termios_orig = Termios::from_fd(fd)?;
    let mut termios_vm = termios_orig;
    // https://man7.org/linux/man-pages/man3/termios.3.html
    termios_vm.c_lflag &= !(ICANON | ECHO);
    tcsetattr(fd, TCSANOW, &termios_vm)?;
    Ok(RawLock { fd, termios_orig })
}

/// Writes and flushes. Guest output has to be visible before the VM blocks
/// on the next key.
///
/// # Errors
/// - the write or the flush failed
pub fn print(out: &mut impl Write, message: &str) -> std::io::Result<()> {
    out.write_all(message.as_bytes())?;
    out.flush()
}
