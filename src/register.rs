use num::traits::ToPrimitive;
use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

/// One of the three general-purpose registers. `PC` and `SP` are tracked
/// separately on `Core` since neither can appear as an instruction operand.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum RegisterId {
    A,
    R0,
    R1,
}

impl std::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[inline]
pub fn register_index(id: RegisterId) -> usize {
    id.to_u32().unwrap() as usize
}

/// Resolves the "other" register bit used by register-mode LD/ST/ALU
/// encodings (see the primary/R table in the ISA tables).
///
/// Returns `None` when `other` is the same register as `primary` — that
/// combination has no encoding, since a register cannot be its own operand
/// in register mode.
pub fn register_bit(primary: RegisterId, other: RegisterId) -> Option<u8> {
    use RegisterId::*;
    match (primary, other) {
        (A, R0) | (R0, A) | (R1, A) => Some(0),
        (A, R1) | (R0, R1) | (R1, R0) => Some(1),
        _ => None,
    }
}

/// Inverse of [`register_bit`]: given a primary register and an `R` bit,
/// returns which register it names.
pub fn register_from_bit(primary: RegisterId, bit: u8) -> RegisterId {
    use RegisterId::*;
    match (primary, bit) {
        (A, 0) => R0,
        (A, _) => R1,
        (R0, 0) => A,
        (R0, _) => R1,
        (R1, 0) => A,
        (R1, _) => R0,
    }
}
