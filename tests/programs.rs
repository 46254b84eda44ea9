use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

use color_eyre::eyre::Result;

use ls8::memory::parse::ParseErrorKind;
use ls8::memory::StdMem;
use ls8::processor::registers::STACK_START;
use ls8::processor::{ExecError, Processor, Status};

fn run_image(image: &str) -> Result<(Processor, String)> {
    let mut mem: StdMem = image.parse()?;
    let mut cpu = Processor::default();
    let mut out = Vec::new();
    cpu.execute_until_halt(&mut mem, &mut out)?;
    Ok((cpu, String::from_utf8(out)?))
}

#[test]
fn mult_prints_72() -> Result<()> {
    let (cpu, out) = run_image(include_str!("../demos/programs/mult.ls8"))?;
    assert_eq!(out, "72\n");
    assert_eq!(cpu.status, Status::Halted);

    Ok(())
}

#[test]
fn stack_program() -> Result<()> {
    let (cpu, out) = run_image(include_str!("../demos/programs/stack.ls8"))?;
    assert_eq!(out, "2\n4\n1\n");
    assert_eq!(cpu.regs.sp(), STACK_START);

    Ok(())
}

#[test]
fn call_program() -> Result<()> {
    let (cpu, out) = run_image(include_str!("../demos/programs/call.ls8"))?;
    assert_eq!(out, "20\n30\n36\n60\n");
    assert_eq!(cpu.regs.sp(), STACK_START);

    Ok(())
}

#[test]
fn count_program() -> Result<()> {
    let (_, out) = run_image(include_str!("../demos/programs/count.ls8"))?;
    assert_eq!(out, "1\n2\n3\n4\n");

    Ok(())
}

#[test]
fn push_unloaded_register_then_pop() -> Result<()> {
    let image = "
        01000101 # PUSH R0
        00000000
        01000110 # POP R1
        00000001
        00000001 # HLT
    ";

    let (cpu, out) = run_image(image)?;
    assert!(out.is_empty());
    assert_eq!(cpu.regs.get(1)?, 0);
    assert_eq!(cpu.regs.sp(), 244);

    Ok(())
}

#[test]
fn empty_image_is_rejected() {
    let errors = "# nothing here\n".parse::<StdMem>().unwrap_err();
    assert_eq!(errors.errors()[0].kind(), ParseErrorKind::EmptyProgram);
}

#[test]
fn unknown_opcode_is_fatal() -> Result<()> {
    let mut mem: StdMem = "
        10000010 # LDI R0,1
        00000000
        00000001
        00001111
    "
    .parse()?;
    let mut cpu = Processor::default();
    let mut out = Vec::new();

    let err = cpu.execute_until_halt(&mut mem, &mut out).unwrap_err();
    assert!(matches!(err, ExecError::UnknownOpcode { byte: 0x0F, pc: 3 }));
    assert_eq!(cpu.pc, 3);
    assert_eq!(cpu.status, Status::Halted);

    Ok(())
}

fn temp_image(name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("ls8-{}-{}", std::process::id(), name));
    fs::write(&path, contents)?;
    Ok(path)
}

fn ls8(args: &[&str]) -> io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_ls8"))
        .args(args)
        .env("LS8_LOG", "off")
        .output()
}

#[test]
fn cli_runs_program() -> Result<()> {
    let output = ls8(&["demos/programs/mult.ls8"])?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8(output.stdout)?, "72\n");

    Ok(())
}

#[test]
fn cli_usage_errors() -> Result<()> {
    assert_eq!(ls8(&[])?.status.code(), Some(2));
    assert_eq!(ls8(&["a.ls8", "b.ls8"])?.status.code(), Some(2));
    assert_eq!(ls8(&["does/not/exist.ls8"])?.status.code(), Some(2));

    Ok(())
}

#[test]
fn cli_reports_errors_on_stderr() -> Result<()> {
    let output = ls8(&["does/not/exist.ls8"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr)?.contains("does/not/exist.ls8"));

    let output = ls8(&[])?;
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr)?.contains("missing input file"));

    Ok(())
}

#[test]
fn cli_program_errors() -> Result<()> {
    let empty = temp_image("empty.ls8", "\n# comment only\n")?;
    let output = ls8(&[empty.to_str().unwrap_or_default()])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let alu = temp_image("alu.ls8", "10100011\n00000000\n00000001\n")?;
    assert_eq!(ls8(&[alu.to_str().unwrap_or_default()])?.status.code(), Some(1));

    fs::remove_file(empty)?;
    fs::remove_file(alu)?;

    Ok(())
}
