//! Pass 2: walks the sized, symbol-resolved lines from pass 1 and emits the
//! final byte image plus a source listing.

use crate::ast::{Directive, Expr, LineBody};
use crate::encode::encode_instruction;
use crate::error::Error;
use crate::listing::{Listing, ListingLine};
use crate::literal::{as_db_byte, unescape};
use crate::pass1::SizedLine;
use crate::symtab::SymbolTable;
use objfmt::Image;

fn db_byte(expr: &Expr, symtab: &SymbolTable, line_no: usize) -> Result<u8, Error> {
    match expr {
        Expr::Literal(v) => as_db_byte(*v, &v.to_string())
            .map_err(|e| Error::new(crate::error::ErrorKind::Lex(e), line_no)),
        Expr::Symbol(name) => symtab
            .resolve(name)
            .map_err(|e| Error::new(crate::error::ErrorKind::Symbol(e), line_no)),
        Expr::Negate(inner) => Ok(db_byte(inner, symtab, line_no)?.wrapping_neg()),
    }
}

pub fn run(sized: &[SizedLine], symtab: &SymbolTable) -> Result<(Image, Listing), Error> {
    let mut image = Image::new();
    let mut listing = Listing::default();

    for sized_line in sized {
        let line = sized_line.line;
        let address = sized_line.address;

        let bytes: Vec<u8> = match &line.body {
            LineBody::Empty => Vec::new(),
            LineBody::Directive(Directive::Org(_)) => Vec::new(),
            LineBody::Directive(Directive::Equ(_, _)) => Vec::new(),
            LineBody::Directive(Directive::Db(exprs)) => {
                let mut out = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    let value = db_byte(expr, symtab, line.line_no)?;
                    out.push(value);
                }
                out
            }
            LineBody::Directive(Directive::Ds(bytes)) => bytes.clone(),
            LineBody::Instruction(mnemonic, operands) => {
                encode_instruction(*mnemonic, operands, symtab, address, line.line_no)?
            }
        };

        for (offset, byte) in bytes.iter().enumerate() {
            image.insert(address.wrapping_add(offset as u8), *byte);
        }

        let listing_address = match &line.body {
            LineBody::Empty => None,
            _ => Some(address),
        };
        listing.lines.push(ListingLine {
            address: listing_address,
            bytes,
            source: line.text.clone(),
        });
    }

    Ok((image, listing))
}

/// Expands a `.DS "literal"` directive's string into its terminated byte
/// sequence. Called while building the AST, ahead of pass 1, since `.DS`'s
/// byte count must already be known to advance `L`.
pub fn expand_ds(text: &str) -> Vec<u8> {
    let mut bytes = unescape(text);
    bytes.push(0);
    bytes
}
