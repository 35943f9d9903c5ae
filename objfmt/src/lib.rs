//! Object file writers and loaders for EDU-CPU's three formats: raw binary,
//! Intel HEX, and Motorola S-record. Also provides multi-file loading with
//! overlap detection and the loaded-address set fed to the CPU core.

pub mod bin;
pub mod error;
mod hexutil;
pub mod hex;
pub mod format;
pub mod image;
pub mod load;
pub mod srec;

pub use error::Error;
pub use format::Format;
pub use image::Image;
pub use load::{load_files, load_many, load_one, LoadedSet, Provenance};
