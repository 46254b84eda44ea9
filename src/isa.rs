//! Instruction byte layout:
//!
//! ```text
//! AABCDDDD
//! AA   number of operands following the instruction byte
//! B    1 if the operation is handled by the ALU
//! C    1 if the operation sets the PC itself
//! DDDD opcode identifier within its group
//! ```

use num_enum::TryFromPrimitive;

use crate::memory::{Byte, Word};

pub const OPERAND_COUNT_SHIFT: u8 = 6;
pub const ALU_BIT: Byte = 0b0010_0000;
pub const SETS_PC_BIT: Byte = 0b0001_0000;
pub const OPCODE_MASK: Byte = 0b0000_1111;

/// Builds an instruction byte from its fields
pub const fn encode(operand_count: u8, group: Byte, opcode: u8) -> Byte {
    (operand_count << OPERAND_COUNT_SHIFT) | group | (opcode & OPCODE_MASK)
}

/// The fields of a single instruction byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoded {
    pub operand_count: u8,
    pub is_alu: bool,
    pub sets_pc: bool,
    pub opcode: u8,
}

impl Decoded {
    /// Number of bytes the instruction occupies including its operands
    pub fn size(&self) -> Word {
        1 + self.operand_count as Word
    }
}

/// Splits an instruction byte into its fields. Every byte decodes.
pub const fn decode(byte: Byte) -> Decoded {
    Decoded {
        operand_count: byte >> OPERAND_COUNT_SHIFT,
        is_alu: byte & ALU_BIT != 0,
        sets_pc: byte & SETS_PC_BIT != 0,
        opcode: byte & OPCODE_MASK,
    }
}

macro_rules! opcodes {
    (
        $( #[doc = $group_doc:expr] )+
        $group:ident ( $bits:expr ) {
            $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal ( $arity:literal ) , )+
        }
    ) => {
        $( #[doc = $group_doc] )+
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive)]
        pub enum $group {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl $group {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            /// Number of operand bytes the operation consumes
            pub const fn arity(self) -> u8 {
                match self {
                    $( Self::$name => $arity , )+
                }
            }

            /// The full instruction byte
            pub const fn encode(self) -> Byte {
                encode(self.arity(), $bits, self as u8)
            }
        }

        impl ::std::fmt::Display for $group {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        $(
            $( #[doc = $doc] )+
            pub const $name: Byte = encode($arity, $bits, $repr);
        )+
    };
}

opcodes! {
    /// Operations that leave control flow to the execution loop
    FlowOp(0) {
        /// Halt the machine
        HLT = 0x1 (0),
        /// Load an immediate into a register
        /// @param register
        /// @param value
        LDI = 0x2 (2),
        /// Push a register onto the stack
        /// @param register
        PUSH = 0x5 (1),
        /// Pop the top of the stack into a register
        /// @param register
        POP = 0x6 (1),
        /// Print the decimal value of a register
        /// @param register
        PRN = 0x7 (1),
    }
}

opcodes! {
    /// Operations that set the program counter
    BranchOp(SETS_PC_BIT) {
        /// Push the return address and jump to the address in a register
        /// @param register
        CALL = 0x0 (1),
        /// Pop the return address into the PC
        RET = 0x1 (0),
        /// Jump to the address in a register
        /// @param register
        JMP = 0x4 (1),
        /// Jump if the equal flag is set
        /// @param register
        JEQ = 0x5 (1),
        /// Jump if the equal flag is clear
        /// @param register
        JNE = 0x6 (1),
    }
}

opcodes! {
    /// Register to register operations of the ALU
    AluOp(ALU_BIT) {
        /// Add the second register to the first
        /// @param register a
        /// @param register b
        ADD = 0x0 (2),
        /// Multiply the first register by the second
        /// @param register a
        /// @param register b
        MUL = 0x2 (2),
        /// Compare two registers and set the flags
        /// @param register a
        /// @param register b
        CMP = 0x7 (2),
    }
}
