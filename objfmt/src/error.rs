use std::error::Error as StdError;
use std::fmt;

/// A malformed object file: bad record syntax, bad checksum, or an address
/// outside the 0..255 space EDU-CPU addresses.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ObjectFormatError {
    MalformedRecord { line: usize, message: String },
    BadChecksum { line: usize, expected: u8, actual: u8 },
    AddressOutOfRange { line: usize, address: u32 },
    RawBinaryWithMultipleFiles,
}

impl fmt::Display for ObjectFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ObjectFormatError::MalformedRecord { line, message } => {
                write!(f, "line {}: malformed record: {}", line, message)
            }
            ObjectFormatError::BadChecksum {
                line,
                expected,
                actual,
            } => write!(
                f,
                "line {}: bad checksum: expected 0x{:02X}, got 0x{:02X}",
                line, expected, actual
            ),
            ObjectFormatError::AddressOutOfRange { line, address } => write!(
                f,
                "line {}: address 0x{:X} is outside the 0..255 address space",
                line, address
            ),
            ObjectFormatError::RawBinaryWithMultipleFiles => f.write_str(
                "raw binary format is only permitted when exactly one file is loaded",
            ),
        }
    }
}

impl StdError for ObjectFormatError {}

/// Two files claimed the same memory cell while loading a multi-file
/// image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverlapError {
    pub file_a: String,
    pub file_b: String,
    pub addresses: Vec<u8>,
}

impl fmt::Display for OverlapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ERROR: Overlap between {} and {} at ", self.file_a, self.file_b)?;
        for (i, addr) in self.addresses.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "0x{:02X}", addr)?;
        }
        Ok(())
    }
}

impl StdError for OverlapError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Format(ObjectFormatError),
    Overlap(OverlapError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Format(err) => write!(f, "{}", err),
            Error::Overlap(err) => write!(f, "{}", err),
        }
    }
}

impl StdError for Error {}

impl From<ObjectFormatError> for Error {
    fn from(err: ObjectFormatError) -> Error {
        Error::Format(err)
    }
}

impl From<OverlapError> for Error {
    fn from(err: OverlapError) -> Error {
        Error::Overlap(err)
    }
}
