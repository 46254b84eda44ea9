use std::error;
use std::fmt;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u16; // 2 bytes

/// Size of the machine memory in bytes
pub const RAM_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<RAM_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    OutOfRange { address: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfRange { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
        }
    }
}

impl error::Error for MemoryError {}

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory
    pub fn read_byte(&self, position: Word) -> Result<Byte, MemoryError> {
        self.data
            .get(position as usize)
            .copied()
            .ok_or(MemoryError::OutOfRange {
                address: position as usize,
            })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: Word, value: Byte) -> Result<(), MemoryError> {
        let cell = self
            .data
            .get_mut(position as usize)
            .ok_or(MemoryError::OutOfRange {
                address: position as usize,
            })?;
        *cell = value;
        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: Word, data: &[Byte]) -> Result<(), MemoryError> {
        let start = position as usize;
        let end = start + data.len();
        if end > S {
            return Err(MemoryError::OutOfRange { address: end - 1 });
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Logs every row of 16 bytes that holds anything but zeroes
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }

            let bytes = chunk
                .iter()
                .map(|byte| format!("{:02X}", byte))
                .collect::<Vec<_>>()
                .join(" ");
            log::debug!("{:02X}: {}", row * 16, bytes);
        }
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
