//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT

use std::borrow::Cow;
use std::error;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::{fmt, str::Lines};

use color_eyre::eyre::{self, WrapErr};

use super::{Byte, Memory};

/// Number of binary digits of an instruction byte
const BYTE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidNumber { radix: u32 },
    EmptyProgram,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
            }
            ParseErrorKind::EmptyProgram => f.write_str("program contains no instructions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

/// Every error found in a program image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl error::Error for ParseErrors {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: usize,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will fill `memory` from address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all lines into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end. An
    /// image without a single instruction byte is an error as well.
    pub fn parse(mut self) -> Result<Memory<S>, ParseErrors> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::debug!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() && self.position == 0 {
            errors.push(ParseError::new(
                ParseErrorKind::EmptyProgram,
                "no instruction lines",
                self.line_nr,
            ));
        }

        if errors.is_empty() {
            log::debug!("Loaded {} bytes", self.position);
            Ok(self.memory)
        } else {
            Err(ParseErrors(errors))
        }
    }

    /// Tries to parse the next line. Each instruction byte should be located
    /// on its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?.trim_start();
        self.line_nr += 1;

        if line.starts_with('0') || line.starts_with('1') {
            Some(self.parse_instruction(line))
        } else {
            // Comment or empty line; skip
            Some(Ok(()))
        }
    }

    /// Tries to parse a line as an instruction byte. Anything after the eight
    /// binary digits is a comment.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `01000111 # PRN R0`
    fn parse_instruction(&mut self, line: &str) -> Result<()> {
        let line_nr = self.line_nr;
        let invalid = |context: &'static str| {
            ParseError::new(ParseErrorKind::InvalidNumber { radix: 2 }, context, line_nr)
        };

        let digits = line
            .get(..BYTE_DIGITS)
            .ok_or_else(|| invalid("an instruction needs eight binary digits"))?;
        let byte = Byte::from_str_radix(digits, 2)
            .map_err(|_| invalid("an instruction needs eight binary digits"))?;

        if line[BYTE_DIGITS..].starts_with(|c: char| c == '0' || c == '1') {
            return Err(invalid("an instruction has at most eight binary digits"));
        }

        log::debug!("[{}] Found byte 0b{:08b}", self.line_nr, byte);

        self.write_byte(byte)
    }

    /// Writes `byte` at the current position and moves on by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the program does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        let (position, line_nr) = (self.position, self.line_nr);
        let cell = self.memory.data.get_mut(position).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidAddress { address: position },
                "program is larger than memory",
                line_nr,
            )
        })?;
        *cell = byte;
        self.position += 1;

        Ok(())
    }
}

impl<const S: usize> FromStr for Memory<S> {
    type Err = ParseErrors;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Parser::new(data, Memory::default()).parse()
    }
}

impl<const S: usize> Memory<S> {
    /// Loads a program image from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read `{}`", path.display()))?;

        data.parse()
            .wrap_err_with(|| format!("invalid program `{}`", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use crate::isa::{HLT, LDI, MUL, PRN};
    use crate::memory::{Memory, StdMem};
    use std::str::FromStr;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_mult() -> Result<()> {
        let data = r#"
            # mult.ls8
            10000010 # LDI R0,8
            00000000
            00001000
            10000010 # LDI R1,9
            00000001
            00001001
            10100010 # MUL R0,R1
            00000000
            00000001
            01000111 # PRN R0
            00000000
            00000001 # HLT
        "#;

        let mem = StdMem::from_str(data)?;

        assert_eq!(
            &mem.data[..12],
            &[LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT]
        );
        assert!(mem.data[12..].iter().all(|&byte| byte == 0));

        Ok(())
    }

    #[test]
    fn parse_skips_non_code_lines() -> Result<()> {
        let data = "\n# comment\nLDI R0\n  \n00000001\n";

        let mem = StdMem::from_str(data)?;
        assert_eq!(mem.read_byte(0)?, HLT);
        assert_eq!(mem.read_byte(1)?, 0);

        Ok(())
    }

    #[test]
    fn parse_without_trailing_text() -> Result<()> {
        let mem = StdMem::from_str("11111111")?;
        assert_eq!(mem.read_byte(0)?, 0xFF);

        Ok(())
    }

    #[test]
    fn parse_empty_program() {
        for data in ["", "\n\n", "# only a comment\n"].iter() {
            let errors = StdMem::from_str(data).unwrap_err();

            assert_eq!(errors.errors().len(), 1);
            assert_eq!(errors.errors()[0].kind(), ParseErrorKind::EmptyProgram);
        }
    }

    #[test]
    fn parse_empty_program_message() {
        let errors = StdMem::from_str("# a\n# b\n").unwrap_err();
        assert_eq!(
            errors.to_string(),
            "error [ln: 2]: program contains no instructions - no instruction lines"
        );
    }

    #[test]
    fn parse_invalid_digits() {
        let data = "00000001\n0101\n10000012\n100000010\n";

        let errors = StdMem::from_str(data).unwrap_err();
        let lines: Vec<_> = errors.errors().iter().map(ParseError::line_nr).collect();

        assert_eq!(lines, vec![2, 3, 4]);
        assert!(errors
            .errors()
            .iter()
            .all(|err| err.kind() == ParseErrorKind::InvalidNumber { radix: 2 }));
    }

    #[test]
    fn parse_program_too_large() {
        let data = "00000001\n".repeat(5);

        let errors = Memory::<4>::from_str(&data).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ParseError::new(
                ParseErrorKind::InvalidAddress { address: 4 },
                "program is larger than memory",
                5
            )]
        );
    }

    #[test]
    fn parse_missing_file() {
        let report = StdMem::from_file("does/not/exist.ls8").unwrap_err();
        assert!(report.downcast_ref::<std::io::Error>().is_some());
    }
}
