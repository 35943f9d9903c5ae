use crate::error::SymbolError;
use std::collections::HashMap;

/// Maps label and `.EQU` names to their resolved byte value. Shared between
/// pass 1 (which populates it) and pass 2 (which only reads it).
#[derive(Default)]
pub struct SymbolTable {
    symbols: HashMap<String, u8>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn define(&mut self, name: &str, value: u8) -> Result<(), SymbolError> {
        if self.symbols.contains_key(name) {
            return Err(SymbolError::Duplicate(name.to_string()));
        }
        self.symbols.insert(name.to_string(), value);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<u8, SymbolError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| SymbolError::Undefined(name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_definition_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("LOOP", 0x10).unwrap();
        assert_eq!(
            table.define("LOOP", 0x20),
            Err(SymbolError::Duplicate("LOOP".to_string()))
        );
    }

    #[test]
    fn undefined_symbol_is_rejected() {
        let table = SymbolTable::new();
        assert_eq!(
            table.resolve("MISSING"),
            Err(SymbolError::Undefined("MISSING".to_string()))
        );
    }
}
