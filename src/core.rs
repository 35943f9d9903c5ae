//! The cycle-stepping execution core: registers, flags, hardware stack, and
//! the fetch/decode/execute loop.

use crate::constants::{REGISTER_COUNT, STACK_DEPTH};
use crate::error::RuntimeError;
use crate::isa::{
    decode_opcode, fixed_register, instruction_size, register_from_select, AddressingMode,
    Mnemonic,
};
use crate::memory::Memory;
use crate::register::{register_from_bit, register_index, RegisterId};
use crate::sink::OutputSink;
use crate::trace::Snapshot;
use std::io::Write;

/// Internal `push`/`pop` failure, before it is stamped with the PC and
/// cycle ordinal that turn it into a reportable [`RuntimeError`].
enum StackFault {
    Overflow,
    Underflow,
}

/// The full state of one EDU-CPU: registers, flags, hardware stack, main
/// memory, and the bookkeeping (`halted`, `cycle`) the execution loop needs.
pub struct Core {
    registers: [u8; REGISTER_COUNT],
    pc: u8,
    sp: usize,
    stack: [u8; STACK_DEPTH],
    zero: bool,
    carry: bool,
    memory: Memory,
    halted: bool,
    cycle: u64,
}

impl Core {
    pub fn new() -> Core {
        Core {
            registers: [0; REGISTER_COUNT],
            pc: 0,
            sp: 0,
            stack: [0; STACK_DEPTH],
            zero: false,
            carry: false,
            memory: Memory::new(),
            halted: false,
            cycle: 0,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn register(&self, id: RegisterId) -> u8 {
        self.registers[register_index(id)]
    }

    pub fn set_register(&mut self, id: RegisterId, value: u8) {
        self.registers[register_index(id)] = value;
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u8) {
        self.pc = pc;
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn zero(&self) -> bool {
        self.zero
    }

    pub fn carry(&self) -> bool {
        self.carry
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc,
            a: self.register(RegisterId::A),
            r0: self.register(RegisterId::R0),
            r1: self.register(RegisterId::R1),
            sp: self.sp,
            zero: self.zero,
            carry: self.carry,
            next_opcode: self.memory.read(self.pc),
        }
    }

    fn read_mem(&self, address: u8) -> u8 {
        if Memory::is_output_port(address) {
            0
        } else {
            self.memory.read(address)
        }
    }

    fn write_mem(&mut self, address: u8, value: u8, sink: &mut dyn OutputSink) {
        if Memory::is_output_port(address) {
            sink.write_byte(value);
        } else {
            self.memory.write(address, value);
        }
    }

    fn read_operand(
        &self,
        mode: AddressingMode,
        r: u8,
        primary: RegisterId,
        operand: Option<u8>,
    ) -> u8 {
        match mode {
            AddressingMode::Immediate => operand.expect("immediate mode always has an operand"),
            AddressingMode::Register => {
                let other = register_from_bit(primary, r);
                self.register(other)
            }
            AddressingMode::Direct => {
                let addr = operand.expect("direct mode always has an operand");
                self.read_mem(addr)
            }
            AddressingMode::Indexed => {
                let addr = self.indexed_address(r, operand);
                self.read_mem(addr)
            }
        }
    }

    fn indexed_address(&self, r: u8, operand: Option<u8>) -> u8 {
        let index_reg = if r == 0 { RegisterId::R0 } else { RegisterId::R1 };
        let base = self.register(index_reg);
        let offset = operand.expect("indexed mode always has an operand") as i8;
        base.wrapping_add(offset as u8)
    }

    fn push(&mut self, value: u8) -> Result<(), StackFault> {
        if self.sp >= STACK_DEPTH {
            return Err(StackFault::Overflow);
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<u8, StackFault> {
        if self.sp == 0 {
            return Err(StackFault::Underflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Executes exactly one instruction: fetch, decode, execute, update
    /// flags, advance the cycle counter. Writes a trace line (if `trace` is
    /// `Some`) before the runaway-fetch check, matching the order described
    /// for tracing.
    pub fn step(
        &mut self,
        sink: &mut dyn OutputSink,
        mut trace: Option<&mut dyn Write>,
    ) -> Result<(), RuntimeError> {
        if let Some(w) = trace.as_deref_mut() {
            let _ = writeln!(w, "{}", self.snapshot());
        }

        let pc = self.pc;
        let ordinal = self.cycle + 1;

        if !self.memory.is_loaded(pc) {
            return Err(RuntimeError::RunawayFetch { pc, cycle: ordinal });
        }

        let opcode_byte = self.memory.read(pc);
        let (mnemonic, r, mm) = decode_opcode(opcode_byte)
            .map_err(|_| RuntimeError::RunawayFetch { pc, cycle: ordinal })?;

        let size = instruction_size(mnemonic, mm);
        let operand = if size == 2 {
            Some(self.memory.read(pc.wrapping_add(1)))
        } else {
            None
        };
        self.pc = pc.wrapping_add(size);

        self.execute(mnemonic, r, mm, operand, sink)
            .map_err(|fault| match fault {
                StackFault::Overflow => RuntimeError::StackOverflow { pc, cycle: ordinal },
                StackFault::Underflow => RuntimeError::StackUnderflow { pc, cycle: ordinal },
            })?;
        self.cycle += 1;
        Ok(())
    }

    fn execute(
        &mut self,
        mnemonic: Mnemonic,
        r: u8,
        mm: u8,
        operand: Option<u8>,
        sink: &mut dyn OutputSink,
    ) -> Result<(), StackFault> {
        use Mnemonic::*;

        if let Some(primary) = fixed_register(mnemonic) {
            let mode = AddressingMode::from_mm_bits(mm);
            return self.execute_load_store(mnemonic, primary, mode, r, operand, sink);
        }

        match mnemonic {
            NOP => {}
            HLT => self.halted = true,
            ADD | SUB | AND | OR | XOR | CMP => {
                let mode = AddressingMode::from_mm_bits(mm);
                let src = self.read_operand(mode, r, RegisterId::A, operand);
                self.execute_alu(mnemonic, src);
            }
            INC | DEC => {
                let reg = register_from_select(mm);
                let value = self.register(reg);
                let result = if mnemonic == INC {
                    value.wrapping_add(1)
                } else {
                    value.wrapping_sub(1)
                };
                self.set_register(reg, result);
                self.zero = result == 0;
            }
            PUSH => {
                let reg = register_from_select(mm);
                let value = self.register(reg);
                self.push(value)?;
            }
            POP => {
                let reg = register_from_select(mm);
                let value = self.pop()?;
                self.set_register(reg, value);
            }
            JMP => {
                self.pc = operand.expect("JMP always has an operand");
            }
            BZ | BNZ | BC | BNC => {
                let taken = match mnemonic {
                    BZ => self.zero,
                    BNZ => !self.zero,
                    BC => self.carry,
                    _ => !self.carry,
                };
                if taken {
                    let disp = operand.expect("branches always have an operand") as i8;
                    self.pc = self.pc.wrapping_add(disp as u8);
                }
            }
            CALL => {
                let target = operand.expect("CALL always has an operand");
                self.push(self.pc)?;
                self.pc = target;
            }
            RET => {
                self.pc = self.pop()?;
            }
            LD_A | LD_R0 | LD_R1 | ST_A | ST_R0 | ST_R1 => {
                unreachable!("handled by fixed_register above")
            }
        }
        Ok(())
    }

    fn execute_load_store(
        &mut self,
        mnemonic: Mnemonic,
        primary: RegisterId,
        mode: AddressingMode,
        r: u8,
        operand: Option<u8>,
        sink: &mut dyn OutputSink,
    ) -> Result<(), StackFault> {
        use Mnemonic::*;
        let is_load = matches!(mnemonic, LD_A | LD_R0 | LD_R1);

        if is_load {
            let value = self.read_operand(mode, r, primary, operand);
            self.set_register(primary, value);
        } else {
            let value = self.register(primary);
            match mode {
                AddressingMode::Register => {
                    let other = register_from_bit(primary, r);
                    self.set_register(other, value);
                }
                AddressingMode::Direct => {
                    let addr = operand.expect("direct mode always has an operand");
                    self.write_mem(addr, value, sink);
                }
                AddressingMode::Indexed => {
                    let addr = self.indexed_address(r, operand);
                    self.write_mem(addr, value, sink);
                }
                AddressingMode::Immediate => {
                    // Rejected at assemble time: ST has no immediate destination.
                }
            }
        }
        Ok(())
    }

    fn execute_alu(&mut self, mnemonic: Mnemonic, src: u8) {
        use Mnemonic::*;
        let a = self.register(RegisterId::A);
        let (result, carry, store) = match mnemonic {
            ADD => {
                let sum = a as u16 + src as u16;
                ((sum & 0xFF) as u8, sum > 0xFF, true)
            }
            SUB => (a.wrapping_sub(src), a >= src, true),
            CMP => (a.wrapping_sub(src), a >= src, false),
            AND => (a & src, false, true),
            OR => (a | src, false, true),
            XOR => (a ^ src, false, true),
            _ => unreachable!("execute_alu only called for ALU mnemonics"),
        };
        self.zero = result == 0;
        self.carry = carry;
        if store {
            self.set_register(RegisterId::A, result);
        }
    }

    /// Runs instructions until `HLT`, a runtime error, or the cycle cap.
    /// Reaching `max_cycles` without halting is itself a fatal
    /// [`RuntimeError::CycleLimit`].
    pub fn run(
        &mut self,
        sink: &mut dyn OutputSink,
        mut trace: Option<&mut dyn Write>,
        max_cycles: u64,
    ) -> Result<(), RuntimeError> {
        while !self.halted {
            if self.cycle >= max_cycles {
                return Err(RuntimeError::CycleLimit {
                    cycle: max_cycles,
                    pc: self.pc,
                });
            }
            self.step(sink, trace.as_deref_mut())?;
        }
        Ok(())
    }
}

impl Default for Core {
    fn default() -> Core {
        Core::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isa::encode_opcode;
    use crate::register::register_bit;

    fn load(core: &mut Core, addr: u8, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            core.memory_mut().load_byte(addr.wrapping_add(i as u8), *b);
        }
    }

    #[test]
    fn immediate_add_scenario() {
        let mut core = Core::new();
        // LD A,#0x37 ; ADD #0x28 ; HLT
        load(&mut core, 0, &[encode_opcode(Mnemonic::LD_A, 0, 0), 0x37]);
        load(&mut core, 2, &[encode_opcode(Mnemonic::ADD, 0, 0), 0x28]);
        load(&mut core, 4, &[encode_opcode(Mnemonic::HLT, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        core.run(&mut sink, None, 65536).unwrap();

        assert_eq!(core.register(RegisterId::A), 0x41);
        assert!(!core.zero());
        assert!(!core.carry());
        assert_eq!(core.cycle(), 3);
        assert!(core.halted());
    }

    #[test]
    fn output_byte_scenario() {
        let mut core = Core::new();
        // LD A,#0x41 ; ST A,[0xFF] ; HLT
        load(&mut core, 0, &[encode_opcode(Mnemonic::LD_A, 0, 0), 0x41]);
        load(&mut core, 2, &[encode_opcode(Mnemonic::ST_A, 0, 0b10), 0xFF]);
        load(&mut core, 4, &[encode_opcode(Mnemonic::HLT, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        core.run(&mut sink, None, 65536).unwrap();

        assert_eq!(sink, vec![0x41]);
        assert_eq!(core.memory().read(0xFF), 0);
    }

    #[test]
    fn branch_not_taken_scenario() {
        let mut core = Core::new();
        // LD A,#1 ; CMP #1 ; BNZ skip ; LD A,#9 ; skip: HLT
        load(&mut core, 0, &[encode_opcode(Mnemonic::LD_A, 0, 0), 1]);
        load(&mut core, 2, &[encode_opcode(Mnemonic::CMP, 0, 0), 1]);
        // BNZ target = 7 (skip). displacement = target - (addr_of_BNZ + 2) = 7 - 6 = 1
        load(&mut core, 4, &[encode_opcode(Mnemonic::BNZ, 0, 0), 1]);
        load(&mut core, 6, &[encode_opcode(Mnemonic::LD_A, 0, 0), 9]);
        load(&mut core, 7, &[encode_opcode(Mnemonic::HLT, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        core.run(&mut sink, None, 65536).unwrap();

        assert_eq!(core.register(RegisterId::A), 9);
        assert!(core.zero());
        assert!(core.carry());
    }

    #[test]
    fn call_ret_scenario() {
        let mut core = Core::new();
        // CALL sub ; HLT ; sub: LD A,#0x55 ; RET
        load(&mut core, 0, &[encode_opcode(Mnemonic::CALL, 0, 0), 3]);
        load(&mut core, 2, &[encode_opcode(Mnemonic::HLT, 0, 0)]);
        load(&mut core, 3, &[encode_opcode(Mnemonic::LD_A, 0, 0), 0x55]);
        load(&mut core, 5, &[encode_opcode(Mnemonic::RET, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        core.run(&mut sink, None, 65536).unwrap();

        assert_eq!(core.register(RegisterId::A), 0x55);
        assert_eq!(core.sp(), 0);
    }

    #[test]
    fn stack_overflow_scenario() {
        let mut core = Core::new();
        let push_a = encode_opcode(Mnemonic::PUSH, 0, 0b00);
        for addr in 0..5u8 {
            load(&mut core, addr, &[push_a]);
        }

        let mut sink: Vec<u8> = Vec::new();
        let err = core.run(&mut sink, None, 65536).unwrap_err();

        assert_eq!(err, RuntimeError::StackOverflow { pc: 4, cycle: 5 });
        assert_eq!(core.cycle(), 4);
    }

    #[test]
    fn runaway_fetch_scenario() {
        let mut core = Core::new();
        load(&mut core, 0, &[encode_opcode(Mnemonic::NOP, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        let err = core.run(&mut sink, None, 65536).unwrap_err();

        assert_eq!(err, RuntimeError::RunawayFetch { pc: 1, cycle: 2 });
        assert_eq!(core.cycle(), 1);
    }

    #[test]
    fn register_mode_ld_uses_other_register_table() {
        let mut core = Core::new();
        core.set_register(RegisterId::R1, 0x99);
        let r = register_bit(RegisterId::A, RegisterId::R1).unwrap();
        load(&mut core, 0, &[encode_opcode(Mnemonic::LD_A, r, 0b01)]);
        load(&mut core, 1, &[encode_opcode(Mnemonic::HLT, 0, 0)]);

        let mut sink: Vec<u8> = Vec::new();
        core.run(&mut sink, None, 65536).unwrap();

        assert_eq!(core.register(RegisterId::A), 0x99);
    }

    #[test]
    fn cycle_limit_is_fatal() {
        let mut core = Core::new();
        load(&mut core, 0, &[encode_opcode(Mnemonic::NOP, 0, 0)]);
        load(&mut core, 1, &[encode_opcode(Mnemonic::JMP, 0, 0), 0]);

        let mut sink: Vec<u8> = Vec::new();
        let err = core.run(&mut sink, None, 3).unwrap_err();

        assert_eq!(err, RuntimeError::CycleLimit { cycle: 3, pc: 1 });
    }
}
