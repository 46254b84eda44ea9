use std::io;
use std::process::ExitCode;

use color_eyre::eyre::{Report, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::config::Config;
use ls8::memory::StdMem;
use ls8::processor::Processor;

/// Normal halt
const EXIT_OK: u8 = 0;
/// Invalid program or fatal execution error
const EXIT_PROGRAM: u8 = 1;
/// Bad invocation or unreadable input
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("{:?}", err);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(EXIT_USAGE);
        }
    };
    init_logger(config.log_level);

    match run(&config) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(exit_code(&report))
        }
    }
}

fn init_logger(level: LevelFilter) {
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialize logging: {}", err);
    }
}

fn run(config: &Config) -> Result<()> {
    let mut mem = StdMem::from_file(&config.program)?;
    mem.dump();

    let mut cpu = Processor::default();
    let stdout = io::stdout();
    cpu.execute_until_halt(&mut mem, &mut stdout.lock())
        .wrap_err_with(|| format!("machine stopped: {}", cpu))?;

    Ok(())
}

fn exit_code(report: &Report) -> u8 {
    // a missing file is a usage error, everything else is the program's fault
    if report.downcast_ref::<io::Error>().is_some() {
        EXIT_USAGE
    } else {
        EXIT_PROGRAM
    }
}
