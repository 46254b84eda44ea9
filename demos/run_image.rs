use color_eyre::eyre::{eyre, Result};
use std::io;

use ls8::memory::StdMem;
use ls8::processor::Processor;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/programs/call.ls8".to_string());
    let mut mem = StdMem::from_file(&path)?;
    let mut cpu = Processor::default();

    cpu.execute_until_halt(&mut mem, &mut io::stdout())?;
    if cpu.regs.sp() != 0xF4 {
        return Err(eyre!("unbalanced stack: {}", cpu));
    }

    Ok(())
}
