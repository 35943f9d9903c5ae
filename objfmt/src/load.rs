use crate::bin::read_bin;
use crate::error::{Error, ObjectFormatError, OverlapError};
use crate::format::Format;
use crate::hex::read_hex;
use crate::image::Image;
use crate::srec::read_srec;
use std::collections::BTreeMap;

/// The loaded-address set consumed by `cpu::core::Core` for runaway-fetch
/// detection: which of the 256 cells were populated by a load, independent
/// of their value.
pub struct LoadedSet([bool; 256]);

impl LoadedSet {
    pub fn new() -> LoadedSet {
        LoadedSet([false; 256])
    }

    pub fn mark(&mut self, address: u8) {
        self.0[address as usize] = true;
    }

    pub fn is_loaded(&self, address: u8) -> bool {
        self.0[address as usize]
    }

    pub fn addresses(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..=255).filter(move |&a| self.is_loaded(a))
    }
}

impl Default for LoadedSet {
    fn default() -> LoadedSet {
        LoadedSet::new()
    }
}

/// Which file first claimed each loaded address.
pub struct Provenance(BTreeMap<u8, String>);

impl Provenance {
    pub fn owner_of(&self, address: u8) -> Option<&str> {
        self.0.get(&address).map(String::as_str)
    }
}

/// Parses one file's bytes into an image according to `format`.
pub fn load_one(format: Format, bytes: &[u8]) -> Result<Image, ObjectFormatError> {
    match format {
        Format::Bin => read_bin(bytes),
        Format::Hex => {
            let text = std::str::from_utf8(bytes).map_err(|_| ObjectFormatError::MalformedRecord {
                line: 1,
                message: "file is not valid UTF-8".to_owned(),
            })?;
            read_hex(text)
        }
        Format::SRec => {
            let text = std::str::from_utf8(bytes).map_err(|_| ObjectFormatError::MalformedRecord {
                line: 1,
                message: "file is not valid UTF-8".to_owned(),
            })?;
            read_srec(text)
        }
    }
}

/// Detects each file's format, enforces that raw binary only appears alone,
/// loads every file, and merges them with overlap detection.
pub fn load_files(
    files: &[(String, Vec<u8>, Option<crate::format::Format>)],
) -> Result<(Image, LoadedSet, Provenance), Error> {
    let mut resolved = Vec::with_capacity(files.len());
    for (name, bytes, forced) in files {
        let format = forced.unwrap_or_else(|| {
            crate::format::detect(std::path::Path::new(name), bytes)
        });
        resolved.push((name.clone(), format));
    }

    if files.len() > 1 && resolved.iter().any(|(_, f)| *f == Format::Bin) {
        return Err(Error::Format(ObjectFormatError::RawBinaryWithMultipleFiles));
    }

    let mut named_images = Vec::with_capacity(files.len());
    for ((name, bytes, _), (_, format)) in files.iter().zip(resolved.iter()) {
        let image = load_one(*format, bytes)?;
        named_images.push((name.clone(), image));
    }

    load_many(&named_images)
}

/// Merges already-parsed per-file images, detecting overlapping writes.
pub fn load_many(files: &[(String, Image)]) -> Result<(Image, LoadedSet, Provenance), Error> {
    let mut merged = Image::new();
    let mut provenance: BTreeMap<u8, String> = BTreeMap::new();
    let mut loaded = LoadedSet::new();

    for (name, image) in files {
        let mut conflicts = Vec::new();
        let mut conflicting_owner: Option<String> = None;
        for &addr in image.keys() {
            if let Some(owner) = provenance.get(&addr) {
                if owner != name {
                    if conflicting_owner.is_none() {
                        conflicting_owner = Some(owner.clone());
                    }
                    if conflicts.len() < 5 {
                        conflicts.push(addr);
                    }
                }
            }
        }
        if let Some(owner) = conflicting_owner {
            return Err(Error::Overlap(OverlapError {
                file_a: owner,
                file_b: name.clone(),
                addresses: conflicts,
            }));
        }

        for (&addr, &byte) in image {
            provenance.insert(addr, name.clone());
            merged.insert(addr, byte);
            loaded.mark(addr);
        }
    }

    Ok((merged, loaded, Provenance(provenance)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overlap_is_rejected() {
        let mut a = Image::new();
        a.insert(0x10, 1);
        let mut b = Image::new();
        b.insert(0x10, 2);

        let err = load_many(&[("a.hex".to_owned(), a), ("b.hex".to_owned(), b)]).unwrap_err();
        match err {
            Error::Overlap(overlap) => {
                assert_eq!(overlap.file_a, "a.hex");
                assert_eq!(overlap.file_b, "b.hex");
                assert_eq!(overlap.addresses, vec![0x10]);
            }
            _ => panic!("expected overlap error"),
        }
    }

    #[test]
    fn disjoint_files_merge() {
        let mut a = Image::new();
        a.insert(0x00, 1);
        let mut b = Image::new();
        b.insert(0x01, 2);

        let (image, loaded, provenance) =
            load_many(&[("a.hex".to_owned(), a), ("b.hex".to_owned(), b)]).unwrap();

        assert_eq!(image.get(&0x00), Some(&1));
        assert_eq!(image.get(&0x01), Some(&2));
        assert!(loaded.is_loaded(0x00));
        assert!(loaded.is_loaded(0x01));
        assert!(!loaded.is_loaded(0x02));
        assert_eq!(provenance.owner_of(0x00), Some("a.hex"));
    }
}
