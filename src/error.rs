use std::error::Error as StdError;
use std::fmt;

/// A condition that halts [`crate::core::Core::run`] other than a normal
/// `HALT`. Every variant carries the cycle ordinal (1-based: "the Nth cycle
/// attempted") and the PC of the instruction that failed, so callers can
/// report both without re-deriving them from a half-updated `Core`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuntimeError {
    /// The program counter fetched from an address never populated by an
    /// object-file load.
    RunawayFetch { pc: u8, cycle: u64 },
    /// `PUSH`/`CALL` with the hardware stack already at its 4-entry depth.
    StackOverflow { pc: u8, cycle: u64 },
    /// `POP`/`RET` with the hardware stack empty.
    StackUnderflow { pc: u8, cycle: u64 },
    /// The cycle cap passed to `run` was reached before a `HALT`.
    CycleLimit { cycle: u64, pc: u8 },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RuntimeError::RunawayFetch { pc, cycle } => write!(
                f,
                "Runaway fetch at cycle {}: PC reached 0x{:02X}, an address no object file loaded.",
                cycle, pc
            ),
            RuntimeError::StackOverflow { pc, cycle } => write!(
                f,
                "Stack overflow at cycle {} (PC 0x{:02X}): stack is already full.",
                cycle, pc
            ),
            RuntimeError::StackUnderflow { pc, cycle } => write!(
                f,
                "Stack underflow at cycle {} (PC 0x{:02X}): stack is already empty.",
                cycle, pc
            ),
            RuntimeError::CycleLimit { cycle, pc } => write!(
                f,
                "Cycle limit of {} reached without a HALT (PC 0x{:02X}).",
                cycle, pc
            ),
        }
    }
}

impl StdError for RuntimeError {
    fn description(&self) -> &str {
        match *self {
            RuntimeError::RunawayFetch { .. } => "Runaway fetch into never-loaded memory.",
            RuntimeError::StackOverflow { .. } => "Hardware stack overflow.",
            RuntimeError::StackUnderflow { .. } => "Hardware stack underflow.",
            RuntimeError::CycleLimit { .. } => "Cycle limit reached.",
        }
    }
}
