use std::convert::TryFrom;
use std::error;
use std::fmt;
use std::io::{self, Write};

use crate::isa::{self, AluOp, BranchOp, Decoded, FlowOp};
use crate::memory::{Byte, Memory, MemoryError, Word};
use log::*;

pub mod alu;
pub mod registers;

use alu::Flags;
use registers::Registers;

/// Everything that stops the machine short of `HLT`
#[derive(Debug)]
pub enum ExecError {
    Memory(MemoryError),
    InvalidRegister {
        index: Byte,
    },
    /// Operand count field of 3
    UnsupportedArity {
        byte: Byte,
        pc: Word,
    },
    /// The opcode is not in the table selected by the sets-PC bit
    UnknownOpcode {
        byte: Byte,
        pc: Word,
    },
    UnsupportedAluOperation {
        byte: Byte,
        pc: Word,
    },
    /// The operand count field disagrees with the operation
    ArityMismatch {
        name: &'static str,
        expected: u8,
        found: u8,
        pc: Word,
    },
    Output(io::Error),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Memory(err) => write!(f, "{}", err),
            ExecError::InvalidRegister { index } => {
                write!(f, "no register `R{}`", index)
            }
            ExecError::UnsupportedArity { byte, pc } => write!(
                f,
                "unsupported operand count in 0b{:08b} at 0x{:02X}",
                byte, pc
            ),
            ExecError::UnknownOpcode { byte, pc } => {
                write!(f, "invalid opcode 0b{:08b} at 0x{:02X}", byte, pc)
            }
            ExecError::UnsupportedAluOperation { byte, pc } => write!(
                f,
                "unsupported ALU operation 0b{:08b} at 0x{:02X}",
                byte, pc
            ),
            ExecError::ArityMismatch {
                name,
                expected,
                found,
                pc,
            } => write!(
                f,
                "{} takes {} operands but {} are encoded at 0x{:02X}",
                name, expected, found, pc
            ),
            ExecError::Output(err) => write!(f, "failed to write output: {}", err),
        }
    }
}

impl error::Error for ExecError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ExecError::Memory(err) => Some(err),
            ExecError::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemoryError> for ExecError {
    fn from(err: MemoryError) -> Self {
        ExecError::Memory(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Running,
    Halted,
}

/// A decoded byte resolved against the dispatch groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Alu(AluOp),
    Branch(BranchOp),
    Flow(FlowOp),
}

impl Operation {
    fn resolve(byte: Byte, decoded: &Decoded, pc: Word) -> Result<Self, ExecError> {
        if decoded.is_alu {
            AluOp::try_from(decoded.opcode)
                .map(Operation::Alu)
                .map_err(|_| ExecError::UnsupportedAluOperation { byte, pc })
        } else if decoded.sets_pc {
            BranchOp::try_from(decoded.opcode)
                .map(Operation::Branch)
                .map_err(|_| ExecError::UnknownOpcode { byte, pc })
        } else {
            FlowOp::try_from(decoded.opcode)
                .map(Operation::Flow)
                .map_err(|_| ExecError::UnknownOpcode { byte, pc })
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Operation::Alu(op) => op.name(),
            Operation::Branch(op) => op.name(),
            Operation::Flow(op) => op.name(),
        }
    }

    fn arity(&self) -> u8 {
        match self {
            Operation::Alu(op) => op.arity(),
            Operation::Branch(op) => op.arity(),
            Operation::Flow(op) => op.arity(),
        }
    }
}

/// Emulates the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: Word,
    /// General purpose registers, R7 is the stack pointer
    pub regs: Registers,
    /// Result of the last comparison
    pub flags: Flags,
    pub status: Status,
}

impl Default for Processor {
    /// Initializes a new CPU starting at address 0
    fn default() -> Self {
        Self::new(0)
    }
}

impl Processor {
    /// Initializes a new CPU
    /// @param entrypoint The start of the program
    pub fn new(entrypoint: Word) -> Self {
        Self {
            pc: entrypoint,
            regs: Registers::default(),
            flags: Flags::default(),
            status: Status::Running,
        }
    }

    /// Runs one execution step. Any error halts the machine.
    pub fn execute<W: Write, const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<Status, ExecError> {
        if let Err(err) = self.step(memory, out) {
            self.status = Status::Halted;
            return Err(err);
        }
        Ok(self.status)
    }

    /// Run program until it halts
    pub fn execute_until_halt<W: Write, const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), ExecError> {
        self.status = Status::Running;
        while self.execute(memory, out)? == Status::Running {}

        info!("Program halted at 0x{:02X}", self.pc);

        Ok(())
    }

    fn step<W: Write, const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), ExecError> {
        self.trace(memory);

        let byte = memory.read_byte(self.pc)?;
        let decoded = isa::decode(byte);
        if decoded.operand_count > 2 {
            return Err(ExecError::UnsupportedArity { byte, pc: self.pc });
        }

        let operation = Operation::resolve(byte, &decoded, self.pc)?;
        if operation.arity() != decoded.operand_count {
            return Err(ExecError::ArityMismatch {
                name: operation.name(),
                expected: operation.arity(),
                found: decoded.operand_count,
                pc: self.pc,
            });
        }

        let mut operands = [0; 2];
        for (offset, operand) in operands
            .iter_mut()
            .take(decoded.operand_count as usize)
            .enumerate()
        {
            *operand = memory.read_byte(self.pc.wrapping_add(1 + offset as Word))?;
        }

        match operation {
            Operation::Alu(op) => {
                alu::apply(op, operands[0], operands[1], &mut self.regs, &mut self.flags)?;
                self.pc += decoded.size();
            }
            Operation::Branch(op) => self.execute_branch(op, operands, memory)?,
            Operation::Flow(op) => self.execute_flow(op, operands, memory, out)?,
        }

        Ok(())
    }

    /// Handlers which advance the PC past themselves
    fn execute_flow<W: Write, const S: usize>(
        &mut self,
        op: FlowOp,
        [a, b]: [Byte; 2],
        memory: &mut Memory<S>,
        out: &mut W,
    ) -> Result<(), ExecError> {
        match op {
            FlowOp::HLT => {
                self.status = Status::Halted;

                debug!("HLT");
                return Ok(());
            }
            FlowOp::LDI => {
                self.regs.set(a, b)?;

                debug!("LDI R{} {}", a, b);
            }
            FlowOp::PUSH => {
                let value = self.regs.get(a)?;
                self.push(value, memory)?;

                debug!("PUSH R{}: {}", a, value);
            }
            FlowOp::POP => {
                let value = memory.read_byte(self.regs.sp() as Word)?;
                self.regs.set(a, value)?;
                self.regs.set_sp(self.regs.sp().wrapping_add(1));

                debug!("POP R{}: {}", a, value);
            }
            FlowOp::PRN => {
                let value = self.regs.get(a)?;
                writeln!(out, "{}", value).map_err(ExecError::Output)?;

                debug!("PRN R{}: {}", a, value);
            }
        }

        self.pc += 1 + op.arity() as Word;

        Ok(())
    }

    /// Handlers which replace the PC
    fn execute_branch<const S: usize>(
        &mut self,
        op: BranchOp,
        [a, _]: [Byte; 2],
        memory: &mut Memory<S>,
    ) -> Result<(), ExecError> {
        match op {
            BranchOp::CALL => {
                let target = self.regs.get(a)?;
                let next = self.pc + 1 + op.arity() as Word;
                let ret = Byte::try_from(next).map_err(|_| MemoryError::OutOfRange {
                    address: next as usize,
                })?;
                self.push(ret, memory)?;
                self.pc = target as Word;

                debug!("CALL R{}: 0x{:02X}, return to 0x{:02X}", a, target, ret);
            }
            BranchOp::RET => {
                self.pc = self.pop(memory)? as Word;

                debug!("RET 0x{:02X}", self.pc);
            }
            BranchOp::JMP => {
                self.pc = self.regs.get(a)? as Word;

                debug!("JMP 0x{:02X}", self.pc);
            }
            BranchOp::JEQ | BranchOp::JNE => {
                let target = self.regs.get(a)?;
                let jump = self.flags.equal() == (op == BranchOp::JEQ);
                if jump {
                    self.pc = target as Word;
                } else {
                    self.pc += 1 + op.arity() as Word;
                }

                debug!("{} 0x{:02X}: {}", op, target, jump);
            }
        }

        Ok(())
    }

    fn push<const S: usize>(&mut self, value: Byte, memory: &mut Memory<S>) -> Result<(), ExecError> {
        let sp = self.regs.sp().wrapping_sub(1);
        memory.write_byte(sp as Word, value)?;
        self.regs.set_sp(sp);
        Ok(())
    }

    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, ExecError> {
        let sp = self.regs.sp();
        let value = memory.read_byte(sp as Word)?;
        self.regs.set_sp(sp.wrapping_add(1));
        Ok(value)
    }

    /// Logs the instruction about to run together with the machine state
    fn trace<const S: usize>(&self, memory: &Memory<S>) {
        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace_line(memory));
        }
    }

    fn trace_line<const S: usize>(&self, memory: &Memory<S>) -> String {
        let peek = |offset: Word| {
            memory
                .read_byte(self.pc.wrapping_add(offset))
                .map_or_else(|_| "--".to_string(), |byte| format!("{:02X}", byte))
        };
        format!("TRACE: {} {} {} | {}", peek(0), peek(1), peek(2), self)
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PC:{:02X} FL:{} {}", self.pc, self.flags, self.regs)
    }
}
