//! Turns one parsed instruction line into its opcode byte(s), per the bit
//! layout and addressing-mode rules in `cpu::isa`.

use crate::ast::{Expr, Operand, SourceMnemonic};
use crate::error::{EncodeError, Error, ErrorKind};
use crate::symtab::SymbolTable;
use cpu::isa::{encode_opcode, AddressingMode, Mnemonic};
use cpu::register::{register_bit, RegisterId};

fn resolve(expr: &Expr, symtab: &SymbolTable, line: usize) -> Result<u8, Error> {
    match expr {
        Expr::Literal(v) => crate::literal::as_u8(*v, &v.to_string())
            .map_err(|e| Error::new(ErrorKind::Lex(e), line)),
        Expr::Symbol(name) => symtab
            .resolve(name)
            .map_err(|e| Error::new(ErrorKind::Symbol(e), line)),
        Expr::Negate(inner) => Ok(resolve(inner, symtab, line)?.wrapping_neg()),
    }
}

fn resolve_signed(expr: &Expr, symtab: &SymbolTable, line: usize) -> Result<i8, Error> {
    match expr {
        Expr::Literal(v) => crate::literal::as_i8_offset(*v, &v.to_string())
            .map_err(|e| Error::new(ErrorKind::Lex(e), line)),
        Expr::Symbol(name) => {
            let byte = symtab
                .resolve(name)
                .map_err(|e| Error::new(ErrorKind::Symbol(e), line))?;
            Ok(byte as i8)
        }
        Expr::Negate(inner) => Ok(resolve_signed(inner, symtab, line)?.wrapping_neg()),
    }
}

/// Register-select bits `PUSH`/`POP`/`INC`/`DEC` pack into `MM` (the inverse
/// of `cpu::isa::register_from_select`).
fn register_select_bits(reg: RegisterId) -> u8 {
    match reg {
        RegisterId::A => 0b00,
        RegisterId::R0 => 0b01,
        RegisterId::R1 => 0b10,
    }
}

/// Indexed addressing only ever indexes through `R0` or `R1` (the opcode's
/// `R` bit has no encoding for `A` as an index register).
fn index_bit(reg: RegisterId, line: usize) -> Result<u8, Error> {
    match reg {
        RegisterId::R0 => Ok(0),
        RegisterId::R1 => Ok(1),
        RegisterId::A => Err(Error::new(
            ErrorKind::Encode(EncodeError::InvalidAddressingMode {
                mnemonic: "indexed addressing".to_string(),
            }),
            line,
        )),
    }
}

fn invalid_mode(mnemonic: SourceMnemonic, line: usize) -> Error {
    Error::new(
        ErrorKind::Encode(EncodeError::InvalidAddressingMode {
            mnemonic: mnemonic.to_string(),
        }),
        line,
    )
}

/// Encodes one instruction's opcode byte plus optional operand byte.
/// `address` is the instruction's own address (`L` at the start of the
/// line), needed to compute branch displacements.
pub fn encode_instruction(
    mnemonic: SourceMnemonic,
    operands: &[Operand],
    symtab: &SymbolTable,
    address: u8,
    line: usize,
) -> Result<Vec<u8>, Error> {
    use SourceMnemonic::*;

    match mnemonic {
        NOP => Ok(vec![encode_opcode(Mnemonic::NOP, 0, 0)]),
        HLT => Ok(vec![encode_opcode(Mnemonic::HLT, 0, 0)]),
        RET => Ok(vec![encode_opcode(Mnemonic::RET, 0, 0)]),

        PUSH | POP | INC | DEC => {
            let reg = match operands.first() {
                Some(Operand::Register(r)) => *r,
                _ => return Err(invalid_mode(mnemonic, line)),
            };
            let code = match mnemonic {
                PUSH => Mnemonic::PUSH,
                POP => Mnemonic::POP,
                INC => Mnemonic::INC,
                _ => Mnemonic::DEC,
            };
            Ok(vec![encode_opcode(code, 0, register_select_bits(reg))])
        }

        JMP | CALL => {
            let target = match operands.first() {
                Some(Operand::Bare(expr)) => resolve(expr, symtab, line)?,
                _ => return Err(invalid_mode(mnemonic, line)),
            };
            let code = if mnemonic == JMP {
                Mnemonic::JMP
            } else {
                Mnemonic::CALL
            };
            Ok(vec![encode_opcode(code, 0, 0), target])
        }

        BZ | BNZ | BC | BNC => {
            let target = match operands.first() {
                Some(Operand::Bare(expr)) => resolve(expr, symtab, line)?,
                _ => return Err(invalid_mode(mnemonic, line)),
            };
            let code = match mnemonic {
                BZ => Mnemonic::BZ,
                BNZ => Mnemonic::BNZ,
                BC => Mnemonic::BC,
                _ => Mnemonic::BNC,
            };
            // Always representable: `target.wrapping_sub(address + 2)` is an
            // 8-bit value by construction, and every 8-bit value is a valid
            // signed displacement once reinterpreted as `i8`. There is no
            // branch an 8-bit address space can name that this cannot reach.
            let disp = target.wrapping_sub(address.wrapping_add(2));
            Ok(vec![encode_opcode(code, 0, 0), disp])
        }

        LD => encode_load_store(true, operands, symtab, line),
        ST => encode_load_store(false, operands, symtab, line),

        ADD | SUB | AND | OR | XOR | CMP => {
            let code = match mnemonic {
                ADD => Mnemonic::ADD,
                SUB => Mnemonic::SUB,
                AND => Mnemonic::AND,
                OR => Mnemonic::OR,
                XOR => Mnemonic::XOR,
                _ => Mnemonic::CMP,
            };
            encode_alu(code, operands, symtab, address, line)
        }
    }
}

/// `LD dst, src` / `ST dst, src`: the first operand names the fixed
/// register (`A`, `R0`, or `R1`), the second is the addressing-mode operand.
fn encode_load_store(
    is_load: bool,
    operands: &[Operand],
    symtab: &SymbolTable,
    line: usize,
) -> Result<Vec<u8>, Error> {
    let primary = match operands.first() {
        Some(Operand::Register(r)) => *r,
        _ => {
            return Err(invalid_mode(
                if is_load {
                    SourceMnemonic::LD
                } else {
                    SourceMnemonic::ST
                },
                line,
            ))
        }
    };
    let mnemonic = match (is_load, primary) {
        (true, RegisterId::A) => Mnemonic::LD_A,
        (true, RegisterId::R0) => Mnemonic::LD_R0,
        (true, RegisterId::R1) => Mnemonic::LD_R1,
        (false, RegisterId::A) => Mnemonic::ST_A,
        (false, RegisterId::R0) => Mnemonic::ST_R0,
        (false, RegisterId::R1) => Mnemonic::ST_R1,
    };

    match operands.get(1) {
        Some(Operand::Immediate(expr)) => {
            if !is_load {
                return Err(Error::new(
                    ErrorKind::Encode(EncodeError::ImmediateDestination),
                    line,
                ));
            }
            let value = resolve(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, 0, AddressingMode::Immediate.mm_bits()),
                value,
            ])
        }
        Some(Operand::Register(other)) => {
            let bit = register_bit(primary, *other).ok_or_else(|| {
                Error::new(ErrorKind::Encode(EncodeError::SameRegisterOperand), line)
            })?;
            Ok(vec![encode_opcode(
                mnemonic,
                bit,
                AddressingMode::Register.mm_bits(),
            )])
        }
        Some(Operand::Direct(expr)) => {
            let addr = resolve(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, 0, AddressingMode::Direct.mm_bits()),
                addr,
            ])
        }
        Some(Operand::Indexed(index_reg, expr)) => {
            let bit = index_bit(*index_reg, line)?;
            let offset = resolve_signed(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, bit, AddressingMode::Indexed.mm_bits()),
                offset as u8,
            ])
        }
        _ => Err(invalid_mode(
            if is_load {
                SourceMnemonic::LD
            } else {
                SourceMnemonic::ST
            },
            line,
        )),
    }
}

/// ALU ops (`ADD`/`SUB`/`AND`/`OR`/`XOR`/`CMP`) always operate against `A` as
/// the implicit accumulator; their sole operand is the addressing-mode
/// source.
fn encode_alu(
    mnemonic: Mnemonic,
    operands: &[Operand],
    symtab: &SymbolTable,
    _address: u8,
    line: usize,
) -> Result<Vec<u8>, Error> {
    match operands.first() {
        Some(Operand::Immediate(expr)) => {
            let value = resolve(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, 0, AddressingMode::Immediate.mm_bits()),
                value,
            ])
        }
        Some(Operand::Register(other)) => {
            let bit = register_bit(RegisterId::A, *other).ok_or_else(|| {
                Error::new(ErrorKind::Encode(EncodeError::SameRegisterOperand), line)
            })?;
            Ok(vec![encode_opcode(
                mnemonic,
                bit,
                AddressingMode::Register.mm_bits(),
            )])
        }
        Some(Operand::Direct(expr)) => {
            let addr = resolve(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, 0, AddressingMode::Direct.mm_bits()),
                addr,
            ])
        }
        Some(Operand::Indexed(index_reg, expr)) => {
            let bit = index_bit(*index_reg, line)?;
            let offset = resolve_signed(expr, symtab, line)?;
            Ok(vec![
                encode_opcode(mnemonic, bit, AddressingMode::Indexed.mm_bits()),
                offset as u8,
            ])
        }
        _ => Err(Error::new(
            ErrorKind::Encode(EncodeError::InvalidAddressingMode {
                mnemonic: mnemonic.to_string(),
            }),
            line,
        )),
    }
}

/// Number of bytes `mnemonic`/`operands` will encode to, without actually
/// resolving symbols — used by pass 1 to advance the location counter.
pub fn instruction_size(mnemonic: SourceMnemonic, operands: &[Operand]) -> u8 {
    use SourceMnemonic::*;
    match mnemonic {
        NOP | HLT | RET | PUSH | POP | INC | DEC => 1,
        JMP | CALL | BZ | BNZ | BC | BNC => 2,
        LD | ST => match operands.get(1) {
            Some(Operand::Register(_)) => 1,
            _ => 2,
        },
        ADD | SUB | AND | OR | XOR | CMP => match operands.first() {
            Some(Operand::Register(_)) => 1,
            _ => 2,
        },
    }
}
