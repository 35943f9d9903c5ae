use crate::error::ObjectFormatError;
use crate::image::{highest_address, Image};

/// Emits bytes `0..=highest_written_address`, with unwritten cells as `0x00`.
pub fn write_bin(image: &Image) -> Vec<u8> {
    match highest_address(image) {
        None => Vec::new(),
        Some(max) => (0..=max).map(|addr| *image.get(&addr).unwrap_or(&0)).collect(),
    }
}

pub fn read_bin(bytes: &[u8]) -> Result<Image, ObjectFormatError> {
    if bytes.len() > 256 {
        return Err(ObjectFormatError::AddressOutOfRange {
            line: 1,
            address: bytes.len() as u32,
        });
    }
    Ok(bytes
        .iter()
        .enumerate()
        .map(|(i, b)| (i as u8, *b))
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let mut image = Image::new();
        image.insert(0, 1);
        image.insert(2, 3);

        let bytes = write_bin(&image);
        assert_eq!(bytes, vec![1, 0, 3]);
        assert_eq!(read_bin(&bytes).unwrap(), image);
    }

    #[test]
    fn empty_image_is_empty_file() {
        assert!(write_bin(&Image::new()).is_empty());
    }
}
