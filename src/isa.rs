//! Instruction set: mnemonics, addressing modes, and the opcode-byte
//! encode/decode helpers built on the bit layout in [`crate::constants`].

use crate::constants::{MM_MASK, MM_OFFSET, OPCODE_MASK, OPCODE_OFFSET, R_MASK, R_OFFSET};
use crate::register::RegisterId;
use num::traits::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};

/// The 25 EDU-CPU instructions, in their assigned 5-bit instruction codes.
///
/// `LD`/`ST` are split one mnemonic per destination/source register (rather
/// than one mnemonic with a register operand) because the opcode byte's `R`
/// bit only has room to disambiguate between the other two registers, not
/// select among all three. Source-level mnemonics (`LD`, `ST`) are mapped
/// onto these by the assembler's lexer, which inspects the register operand
/// — this enum is not parsed directly from source text.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Mnemonic {
    LD_A = 0,
    LD_R0 = 1,
    LD_R1 = 2,
    ST_A = 3,
    ST_R0 = 4,
    ST_R1 = 5,
    ADD = 6,
    SUB = 7,
    AND = 8,
    OR = 9,
    XOR = 10,
    CMP = 11,
    INC = 12,
    DEC = 13,
    PUSH = 14,
    POP = 15,
    JMP = 16,
    CALL = 17,
    RET = 18,
    BZ = 19,
    BNZ = 20,
    HLT = 21,
    BC = 22,
    BNC = 23,
    NOP = 24,
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The addressing mode an operand was written in, selected by the opcode
/// byte's `MM` field for the instructions that admit more than one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddressingMode {
    /// `#imm` — the operand byte is the value itself.
    Immediate,
    /// A bare register name — the other operand of a two-register form.
    Register,
    /// `[addr]` — the operand byte is a direct memory address.
    Direct,
    /// `[Rn+off]` / `[Rn-off]` — indexed through R0 or R1 with a signed offset.
    Indexed,
}

impl AddressingMode {
    pub fn mm_bits(self) -> u8 {
        match self {
            AddressingMode::Immediate => 0b00,
            AddressingMode::Register => 0b01,
            AddressingMode::Direct => 0b10,
            AddressingMode::Indexed => 0b11,
        }
    }

    pub fn from_mm_bits(bits: u8) -> AddressingMode {
        match bits & MM_MASK {
            0b00 => AddressingMode::Immediate,
            0b01 => AddressingMode::Register,
            0b10 => AddressingMode::Direct,
            _ => AddressingMode::Indexed,
        }
    }
}

/// Instructions for which the `MM` field selects a register instead of an
/// addressing mode: `INC`, `DEC`, `PUSH`, `POP` take exactly one register
/// operand and have no other addressing form.
pub fn is_register_select(mnemonic: Mnemonic) -> bool {
    matches!(
        mnemonic,
        Mnemonic::INC | Mnemonic::DEC | Mnemonic::PUSH | Mnemonic::POP
    )
}

/// Packs an instruction code, `R` bit, and `MM`/register-select field into
/// one opcode byte.
pub fn encode_opcode(mnemonic: Mnemonic, r: u8, mm: u8) -> u8 {
    let code = mnemonic.to_u8().expect("Mnemonic always fits in a u8.");
    ((code << OPCODE_OFFSET) & OPCODE_MASK)
        | ((r << R_OFFSET) & R_MASK)
        | ((mm << MM_OFFSET) & MM_MASK)
}

/// Error produced when a byte's top 5 bits do not name any [`Mnemonic`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UnknownOpcode(pub u8);

impl std::fmt::Display for UnknownOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Unknown opcode byte 0x{:02X}.", self.0)
    }
}

impl std::error::Error for UnknownOpcode {}

/// Splits an opcode byte back into its mnemonic, `R` bit, and `MM` field.
pub fn decode_opcode(byte: u8) -> Result<(Mnemonic, u8, u8), UnknownOpcode> {
    let code = (byte & OPCODE_MASK) >> OPCODE_OFFSET;
    let r = (byte & R_MASK) >> R_OFFSET;
    let mm = (byte & MM_MASK) >> MM_OFFSET;
    let mnemonic = Mnemonic::from_u8(code).ok_or(UnknownOpcode(byte))?;
    Ok((mnemonic, r, mm))
}

/// Returns the register an `LD`/`ST` mnemonic addresses as its fixed
/// destination/source.
pub fn fixed_register(mnemonic: Mnemonic) -> Option<RegisterId> {
    match mnemonic {
        Mnemonic::LD_A | Mnemonic::ST_A => Some(RegisterId::A),
        Mnemonic::LD_R0 | Mnemonic::ST_R0 => Some(RegisterId::R0),
        Mnemonic::LD_R1 | Mnemonic::ST_R1 => Some(RegisterId::R1),
        _ => None,
    }
}

/// Whether this mnemonic takes no operand byte at all (`NOP`, `HLT`, `RET`).
pub fn is_implied(mnemonic: Mnemonic) -> bool {
    matches!(mnemonic, Mnemonic::NOP | Mnemonic::HLT | Mnemonic::RET)
}

/// Whether this mnemonic's sole operand is an absolute 8-bit address
/// (`CALL`, `JMP`, `BZ`, `BNZ`, `BC`, `BNC`) rather than an addressing-mode
/// operand.
pub fn is_branch(mnemonic: Mnemonic) -> bool {
    matches!(
        mnemonic,
        Mnemonic::CALL
            | Mnemonic::JMP
            | Mnemonic::BZ
            | Mnemonic::BNZ
            | Mnemonic::BC
            | Mnemonic::BNC
    )
}

/// The register named by the two-bit register-select field `PUSH`/`POP`/
/// `INC`/`DEC` encode in `MM` (00=A, 01=R0, 10/11=R1).
pub fn register_from_select(bits: u8) -> RegisterId {
    match bits & MM_MASK {
        0b00 => RegisterId::A,
        0b01 => RegisterId::R0,
        _ => RegisterId::R1,
    }
}

/// Number of bytes `mnemonic` occupies once encoded, given its `MM` field.
/// Implied and register-select instructions are always 1 byte; branches are
/// always 2; LD/ST/ALU are 1 byte in register mode and 2 otherwise.
pub fn instruction_size(mnemonic: Mnemonic, mm: u8) -> u8 {
    if is_implied(mnemonic) || is_register_select(mnemonic) {
        1
    } else if is_branch(mnemonic) {
        2
    } else if AddressingMode::from_mm_bits(mm) == AddressingMode::Register {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        for code in 0u8..25 {
            let mnemonic = Mnemonic::from_u8(code).unwrap();
            for r in 0u8..=1 {
                for mm in 0u8..=3 {
                    let byte = encode_opcode(mnemonic, r, mm);
                    let (decoded, decoded_r, decoded_mm) = decode_opcode(byte).unwrap();
                    assert_eq!(decoded, mnemonic);
                    assert_eq!(decoded_r, r);
                    assert_eq!(decoded_mm, mm);
                }
            }
        }
    }

    #[test]
    fn unused_codes_are_rejected() {
        for code in 25u8..32 {
            let byte = code << OPCODE_OFFSET;
            assert!(decode_opcode(byte).is_err());
        }
    }

    #[test]
    fn register_bit_table_matches_worked_examples() {
        use crate::register::register_bit;
        use RegisterId::*;
        assert_eq!(register_bit(A, R1), Some(1));
        assert_eq!(register_bit(R0, R1), Some(1));
        assert_eq!(register_bit(R1, R0), Some(0));
    }
}
