//! Pass 1: walks the source once, assigning every label its address and
//! expanding `.EQU`/`.ORG`/`.DB`/`.DS` against a monotonically advancing
//! location counter `L`.

use crate::ast::{Directive, Expr, Line, LineBody};
use crate::encode::instruction_size;
use crate::error::{Error, ErrorKind};
use crate::literal::{as_db_byte, as_u8};
use crate::symtab::SymbolTable;

/// Per-line byte size, recorded so pass 2 doesn't need to recompute it from
/// the (by-then resolved) operands.
pub struct SizedLine<'a> {
    pub line: &'a Line,
    pub address: u8,
    pub size: u8,
}

fn resolve_literal_now(expr: &Expr, symtab: &SymbolTable, line: usize) -> Result<u8, Error> {
    match expr {
        Expr::Literal(v) => as_u8(*v, &v.to_string()).map_err(|e| Error::new(ErrorKind::Lex(e), line)),
        Expr::Symbol(name) => symtab
            .resolve(name)
            .map_err(|e| Error::new(ErrorKind::Symbol(e), line)),
        Expr::Negate(inner) => Ok(resolve_literal_now(inner, symtab, line)?.wrapping_neg()),
    }
}

pub fn run<'a>(lines: &'a [Line]) -> Result<(SymbolTable, Vec<SizedLine<'a>>), Error> {
    let mut symtab = SymbolTable::new();
    let mut sized = Vec::with_capacity(lines.len());
    let mut l: u16 = 0;

    for line in lines {
        let address_before = l;
        if let Some(label) = &line.label {
            if address_before > 0xFF {
                return Err(Error::new(
                    ErrorKind::Parse("location counter ran past the end of memory".to_string()),
                    line.line_no,
                ));
            }
            symtab
                .define(label, address_before as u8)
                .map_err(|e| Error::new(ErrorKind::Symbol(e), line.line_no))?;
        }

        let size: u16 = match &line.body {
            LineBody::Empty => 0,
            LineBody::Directive(Directive::Org(expr)) => {
                let addr = resolve_literal_now(expr, &symtab, line.line_no)?;
                l = addr as u16;
                sized.push(SizedLine {
                    line,
                    address: addr,
                    size: 0,
                });
                continue;
            }
            LineBody::Directive(Directive::Equ(name, expr)) => {
                let value = resolve_literal_now(expr, &symtab, line.line_no)?;
                symtab
                    .define(name, value)
                    .map_err(|e| Error::new(ErrorKind::Symbol(e), line.line_no))?;
                0
            }
            LineBody::Directive(Directive::Db(exprs)) => {
                for expr in exprs {
                    if let Expr::Literal(v) = expr {
                        as_db_byte(*v, &v.to_string())
                            .map_err(|e| Error::new(ErrorKind::Lex(e), line.line_no))?;
                    }
                }
                exprs.len() as u16
            }
            LineBody::Directive(Directive::Ds(bytes)) => bytes.len() as u16,
            LineBody::Instruction(mnemonic, operands) => {
                instruction_size(*mnemonic, operands) as u16
            }
        };

        if address_before as u32 + size as u32 > 0x100 {
            return Err(Error::new(
                ErrorKind::Parse("program does not fit in 256 bytes of address space".to_string()),
                line.line_no,
            ));
        }

        sized.push(SizedLine {
            line,
            address: address_before as u8,
            size: size as u8,
        });
        l += size;
    }

    Ok((symtab, sized))
}
