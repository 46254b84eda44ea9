use std::cmp::Ordering;
use std::fmt;

use log::*;

use crate::isa::AluOp;
use crate::memory::Byte;

use super::registers::Registers;
use super::ExecError;

/// Condition codes set by `CMP`, laid out as `00000LGE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    pub const EQUAL: Byte = 0b0000_0001;
    pub const GREATER: Byte = 0b0000_0010;
    pub const LESS: Byte = 0b0000_0100;

    pub fn bits(&self) -> Byte {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn set(&mut self, bit: Byte) {
        self.0 |= bit;
    }

    pub fn equal(&self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn greater(&self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn less(&self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.less() { "L" } else { "l" },
            if self.greater() { "G" } else { "g" },
            if self.equal() { "E" } else { "e" },
        )
    }
}

/// Runs an ALU operation on registers `a` and `b`.
///
/// Arithmetic wraps at 8 bits. Both register indices are checked before
/// anything is written.
pub fn apply(
    op: AluOp,
    a: Byte,
    b: Byte,
    regs: &mut Registers,
    flags: &mut Flags,
) -> Result<(), ExecError> {
    let lhs = regs.get(a)?;
    let rhs = regs.get(b)?;

    match op {
        AluOp::ADD => {
            let result = lhs.wrapping_add(rhs);
            regs.set(a, result)?;

            debug!("ADD R{} R{}: {}", a, b, result);
        }
        AluOp::MUL => {
            let result = lhs.wrapping_mul(rhs);
            regs.set(a, result)?;

            debug!("MUL R{} R{}: {}", a, b, result);
        }
        AluOp::CMP => {
            flags.reset();
            flags.set(match lhs.cmp(&rhs) {
                Ordering::Equal => Flags::EQUAL,
                Ordering::Greater => Flags::GREATER,
                Ordering::Less => Flags::LESS,
            });

            debug!("CMP {} {}: {}", lhs, rhs, flags);
        }
    }

    Ok(())
}
