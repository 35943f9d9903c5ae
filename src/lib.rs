//! ISA tables, instruction encode/decode, and the cycle-stepping core for
//! the EDU-CPU teaching processor. No I/O and no object-file handling live
//! here — see the `asm` and `objfmt` crates for those.

pub mod constants;
pub mod core;
pub mod error;
pub mod isa;
pub mod memory;
pub mod register;
pub mod sink;
pub mod trace;

pub use crate::core::Core;
pub use error::RuntimeError;
pub use isa::Mnemonic;
pub use memory::Memory;
pub use register::RegisterId;
pub use sink::{OutputSink, StdoutSink};
