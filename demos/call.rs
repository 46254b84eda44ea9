use color_eyre::eyre::Result;
use std::io;

use ls8::isa::*;
use ls8::memory::StdMem;
use ls8::processor::Processor;
use ls8::write_instructions;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Where the subroutine lives
const SUBROUTINE: u16 = 0x40;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().with_level(LevelFilter::Trace).init().unwrap(); // logging

    let mut mem = StdMem::default();
    let mut cpu = Processor::default();

    write_instructions!(mem : 0 =>
        LDI, 1, SUBROUTINE,
        LDI, 0, 21,
        CALL, 1,
        LDI, 0, 50,
        CALL, 1,
        HLT
    )?;

    // doubles R0 and prints it
    write_instructions!(mem : SUBROUTINE =>
        ADD, 0, 0,
        PRN, 0,
        RET
    )?;

    mem.dump();
    cpu.execute_until_halt(&mut mem, &mut io::stdout())?;

    Ok(())
}
