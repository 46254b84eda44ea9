use color_eyre::eyre::Result;
use std::io;

use ls8::isa::*;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use ls8::write_instructions;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().with_level(LevelFilter::Debug).init().unwrap(); // logging

    let mut mem = StdMem::default();
    let mut cpu = Processor::default();

    write_instructions!(mem : 0 =>
        LDI, 0, 8,
        LDI, 1, 9,
        MUL, 0, 1,
        PRN, 0,
        HLT
    )?;

    cpu.execute_until_halt(&mut mem, &mut io::stdout())?;

    Ok(())
}
