//! The assembler's human-readable listing: one line per source line, showing
//! the address and bytes it assembled to alongside the original text.

use std::fmt;

pub struct ListingLine {
    pub address: Option<u8>,
    pub bytes: Vec<u8>,
    pub source: String,
}

impl fmt::Display for ListingLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let address = match self.address {
            Some(a) => format!("{:04X}", a),
            None => "    ".to_string(),
        };
        let mut hex = String::new();
        for byte in self.bytes.iter().take(2) {
            hex.push_str(&format!("{:02X} ", byte));
        }
        write!(f, "{:<4}  {:<6}{}", address, hex, self.source)
    }
}

#[derive(Default)]
pub struct Listing {
    pub lines: Vec<ListingLine>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
