//! Two-pass assembler for EDU-CPU assembly. Parses source with a pest
//! grammar, resolves symbols and computes instruction sizes in pass 1, then
//! encodes bytes and a listing in pass 2.

pub mod ast;
pub mod encode;
pub mod error;
pub mod listing;
pub mod literal;
pub mod parser;
pub mod pass1;
pub mod pass2;
pub mod symtab;

pub use error::Error;
pub use listing::Listing;
pub use parser::Rule;
pub use symtab::SymbolTable;

use objfmt::Image;

/// Assembles a complete source file into its byte image and listing.
pub fn assemble(source: &str) -> Result<(Image, Listing), Error> {
    let lines = parser::parse_program(source)?;
    let (symtab, sized) = pass1::run(&lines)?;
    pass2::run(&sized, &symtab)
}

#[cfg(test)]
mod test {
    use super::*;

    fn assemble_ok(source: &str) -> Image {
        assemble(source)
            .unwrap_or_else(|e| panic!("assembly failed: {}", e))
            .0
    }

    #[test]
    fn immediate_load_and_add() {
        let image = assemble_ok("LD A,#5\nADD #3\nHLT\n");
        assert_eq!(image.len(), 6);
    }

    #[test]
    fn immediate_add_scenario_matches_literal_bytes() {
        let image = assemble_ok("LD A,#37\nADD #28\nHLT\n");
        let bytes: Vec<u8> = (0..5).map(|a| *image.get(&a).unwrap()).collect();
        assert_eq!(bytes, vec![0x00, 0x25, 0x30, 0x1C, 0xA8]);
    }

    #[test]
    fn labels_resolve_forward_and_backward() {
        let image = assemble_ok("JMP done\nNOP\ndone: HLT\n");
        // JMP opcode + absolute target byte (address of `done`, which is 3).
        let target = *image.get(&1).unwrap();
        assert_eq!(target, 3);
    }

    #[test]
    fn equ_defines_a_constant() {
        let image = assemble_ok(".EQU LIMIT, 10\nLD A,#LIMIT\nHLT\n");
        assert_eq!(*image.get(&1).unwrap(), 10);
    }

    #[test]
    fn org_repositions_the_location_counter() {
        let image = assemble_ok(".ORG 0x10\nNOP\n");
        assert!(image.contains_key(&0x10));
        assert!(!image.contains_key(&0x00));
    }

    #[test]
    fn db_and_ds_emit_literal_bytes() {
        let image = assemble_ok(".DB 1,2,3\n.DS \"ab\"\n");
        assert_eq!(*image.get(&0).unwrap(), 1);
        assert_eq!(*image.get(&3).unwrap(), b'a');
        assert_eq!(*image.get(&4).unwrap(), b'b');
        assert_eq!(*image.get(&5).unwrap(), 0);
    }

    #[test]
    fn undefined_symbol_is_rejected() {
        assert!(assemble("JMP nowhere\n").is_err());
    }

    #[test]
    fn duplicate_label_is_rejected() {
        assert!(assemble("here: NOP\nhere: HLT\n").is_err());
    }

    #[test]
    fn branch_displacement_matches_worked_example() {
        // LD A,#1 ; CMP #1 ; BNZ skip ; LD A,#9 ; skip: HLT
        let image = assemble_ok("LD A,#1\nCMP #1\nBNZ skip\nLD A,#9\nskip: HLT\n");
        // BNZ is at address 4, displacement operand at address 5.
        let disp = *image.get(&5).unwrap() as i8;
        assert_eq!(disp, 1);
    }

    #[test]
    fn same_register_operand_is_rejected() {
        assert!(assemble("LD A,A\nHLT\n").is_err());
    }

    #[test]
    fn store_with_immediate_destination_is_rejected() {
        assert!(assemble("ST A,#5\nHLT\n").is_err());
    }

    #[test]
    fn negative_indexed_offset_encodes_twos_complement() {
        let image = assemble_ok("LD A,[R0-5]\nHLT\n");
        let offset = *image.get(&1).unwrap() as i8;
        assert_eq!(offset, -5);
    }

    #[test]
    fn indexed_and_direct_addressing_round_trip() {
        let image = assemble_ok(".ORG 0x20\nval: .DB 7\n.ORG 0\nLD A,[val]\nLD R0,#0\nLD A,[R0+0]\nHLT\n");
        assert_eq!(*image.get(&0x20).unwrap(), 7);
        assert_eq!(*image.get(&1).unwrap(), 0x20);
    }
}
