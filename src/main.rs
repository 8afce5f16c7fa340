use clap::Parser;
use lc3_vm::Emulator;
use lc3_vm::errors::{ExecutionError, Lc3VmError};
use lc3_vm::terminal;
use std::path::PathBuf;

/// Emulator for the LC-3 educational 16-bit computer.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Image files to load before the VM starts
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn main() -> Result<(), Lc3VmError> {
    env_logger::init();
    let args = Args::parse();

    let mut emu = Emulator::new();
    for image in &args.images {
        emu.load_image_file(image)?;
    }

    // single keystrokes have to reach the keyboard device; the guard
    // restores the terminal on drop, also when execution fails
    let _input_buffering = terminal::disable_input_buffering()
        .map_err(|error| ExecutionError::IOInputOutputError(error.to_string()))?;
    emu.execute()?;
    Ok(())
}
