use crate::Rule;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LexError {
    UnknownMnemonic(String),
    MalformedOperand(String),
    NumberOutOfRange(String),
    UnterminatedString,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::UnknownMnemonic(s) => write!(f, "unknown mnemonic \"{}\"", s),
            LexError::MalformedOperand(s) => write!(f, "malformed operand \"{}\"", s),
            LexError::NumberOutOfRange(s) => write!(f, "number \"{}\" is out of range", s),
            LexError::UnterminatedString => f.write_str("unterminated string literal"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    InvalidAddressingMode { mnemonic: String },
    OperandOutOfRange { value: i32 },
    BranchUnreachable { target: u8 },
    SameRegisterOperand,
    ImmediateDestination,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::InvalidAddressingMode { mnemonic } => {
                write!(f, "{} does not support this addressing mode", mnemonic)
            }
            EncodeError::OperandOutOfRange { value } => {
                write!(f, "operand value {} does not fit in a byte", value)
            }
            EncodeError::BranchUnreachable { target } => {
                write!(f, "branch target 0x{:02X} is not reachable", target)
            }
            EncodeError::SameRegisterOperand => {
                f.write_str("a register cannot be its own operand in register mode")
            }
            EncodeError::ImmediateDestination => {
                f.write_str("ST cannot write to an immediate operand")
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SymbolError {
    Undefined(String),
    Duplicate(String),
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolError::Undefined(name) => write!(f, "undefined symbol \"{}\"", name),
            SymbolError::Duplicate(name) => write!(f, "symbol \"{}\" is already defined", name),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Lex(LexError),
    Parse(String),
    Encode(EncodeError),
    Symbol(SymbolError),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Lex(err) => write!(f, "{}", err),
            ErrorKind::Parse(msg) => write!(f, "{}", msg),
            ErrorKind::Encode(err) => write!(f, "{}", err),
            ErrorKind::Symbol(err) => write!(f, "{}", err),
        }
    }
}

/// A fatal assembly error, tagged with the one-based source line it
/// occurred on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
}

impl Error {
    pub fn new(kind: ErrorKind, line: usize) -> Error {
        Error { kind, line }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl StdError for Error {}

impl From<pest::error::Error<Rule>> for Error {
    fn from(err: pest::error::Error<Rule>) -> Error {
        let line = match err.line_col {
            pest::error::LineColLocation::Pos((line, _)) => line,
            pest::error::LineColLocation::Span((line, _), _) => line,
        };
        Error::new(ErrorKind::Parse(err.to_string()), line)
    }
}
