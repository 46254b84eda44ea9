use std::fmt;

use crate::memory::Byte;

use super::ExecError;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;
/// Register reserved for the stack pointer
pub const SP: Byte = 7;
/// Initial value of the stack pointer
pub const STACK_START: Byte = 0xF4;

/// The register file. Slot 7 holds the stack pointer by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers([Byte; REGISTER_COUNT]);

impl Default for Registers {
    fn default() -> Self {
        let mut slots = [0; REGISTER_COUNT];
        slots[SP as usize] = STACK_START;
        Self(slots)
    }
}

impl Registers {
    /// Reads the register named by an operand byte
    pub fn get(&self, index: Byte) -> Result<Byte, ExecError> {
        self.0
            .get(index as usize)
            .copied()
            .ok_or(ExecError::InvalidRegister { index })
    }

    /// Writes the register named by an operand byte
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<(), ExecError> {
        let slot = self
            .0
            .get_mut(index as usize)
            .ok_or(ExecError::InvalidRegister { index })?;
        *slot = value;
        Ok(())
    }

    pub fn sp(&self) -> Byte {
        self.0[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.0[SP as usize] = value;
    }

    pub fn as_slice(&self) -> &[Byte] {
        &self.0
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "R{}:{:02X}", index, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_defaults() {
        let regs = Registers::default();
        assert_eq!(regs.as_slice(), &[0, 0, 0, 0, 0, 0, 0, 0xF4]);
        assert_eq!(regs.sp(), 244);
    }

    #[test]
    fn test_set_and_get() -> Result<()> {
        let mut regs = Registers::default();
        regs.set(3, 99)?;
        assert_eq!(regs.get(3)?, 99);

        Ok(())
    }

    #[test]
    fn test_invalid_index() {
        let mut regs = Registers::default();
        assert!(matches!(
            regs.get(8),
            Err(ExecError::InvalidRegister { index: 8 })
        ));
        assert!(matches!(
            regs.set(200, 1),
            Err(ExecError::InvalidRegister { index: 200 })
        ));
        assert_eq!(regs, Registers::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Registers::default().to_string(),
            "R0:00 R1:00 R2:00 R3:00 R4:00 R5:00 R6:00 R7:F4"
        );
    }
}
