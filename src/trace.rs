//! One-line per-instruction trace formatting.

use std::fmt;

/// The CPU's visible state right before an instruction is fetched, plus the
/// opcode byte about to be fetched.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot {
    pub pc: u8,
    pub a: u8,
    pub r0: u8,
    pub r1: u8,
    pub sp: usize,
    pub zero: bool,
    pub carry: bool,
    pub next_opcode: u8,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PC={:02X} A={:02X} R0={:02X} R1={:02X} SP={} Z={} C={} OP={:02X}",
            self.pc,
            self.a,
            self.r0,
            self.r1,
            self.sp,
            self.zero as u8,
            self.carry as u8,
            self.next_opcode
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_fields_in_order() {
        let snap = Snapshot {
            pc: 0x10,
            a: 1,
            r0: 2,
            r1: 3,
            sp: 0,
            zero: true,
            carry: false,
            next_opcode: 0xAA,
        };
        assert_eq!(
            snap.to_string(),
            "PC=10 A=01 R0=02 R1=03 SP=0 Z=1 C=0 OP=AA"
        );
    }
}
