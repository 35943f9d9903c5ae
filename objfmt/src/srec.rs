use crate::error::ObjectFormatError;
use crate::hexutil::decode_hex_bytes;
use crate::image::Image;

/// Writes `image` as Motorola S-record: an S0 header carrying `name`, S1
/// data records (16-bit big-endian address) for each contiguous run of up
/// to 16 bytes, and a final S9 termination record.
pub fn write_srec(image: &Image, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&record('0', 0, name.as_bytes()));
    out.push('\n');

    let mut iter = image.iter().peekable();
    while let Some((&start_addr, &start_byte)) = iter.next() {
        let mut data = vec![start_byte];
        let mut addr = start_addr;
        while data.len() < 16 {
            match iter.peek() {
                Some(&(&next_addr, &next_byte)) if next_addr == addr.wrapping_add(1) => {
                    data.push(next_byte);
                    addr = next_addr;
                    iter.next();
                }
                _ => break,
            }
        }
        out.push_str(&record('1', start_addr as u16, &data));
        out.push('\n');
    }

    out.push_str(&record('9', 0, &[]));
    out.push('\n');
    out
}

fn record(rec_type: char, address: u16, data: &[u8]) -> String {
    let len = (data.len() + 3) as u8;
    let mut sum = len
        .wrapping_add((address >> 8) as u8)
        .wrapping_add((address & 0xFF) as u8);
    for b in data {
        sum = sum.wrapping_add(*b);
    }
    let checksum = !sum;

    let mut out = format!("S{}{:02X}{:04X}", rec_type, len, address);
    for b in data {
        out.push_str(&format!("{:02X}", b));
    }
    out.push_str(&format!("{:02X}", checksum));
    out
}

/// Parses S-record text back into an image. Stops at the first S9
/// termination record.
pub fn read_srec(text: &str) -> Result<Image, ObjectFormatError> {
    let mut image = Image::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('S') || line.len() < 2 {
            return Err(ObjectFormatError::MalformedRecord {
                line: line_no,
                message: "record must start with 'S'".to_owned(),
            });
        }

        let rec_type = &line[1..2];
        let bytes = decode_hex_bytes(&line[2..], line_no)?;
        if bytes.len() < 3 {
            return Err(ObjectFormatError::MalformedRecord {
                line: line_no,
                message: "record too short".to_owned(),
            });
        }

        let checksum = *bytes.last().unwrap();
        let body = &bytes[..bytes.len() - 1];
        let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        let expected = !sum;
        if expected != checksum {
            return Err(ObjectFormatError::BadChecksum {
                line: line_no,
                expected,
                actual: checksum,
            });
        }

        let addr = ((body[1] as u16) << 8) | body[2] as u16;
        let data = &body[3..];

        match rec_type {
            "0" => {}
            "1" => {
                for (offset, byte) in data.iter().enumerate() {
                    let address = addr.wrapping_add(offset as u16);
                    if address > 0xFF {
                        return Err(ObjectFormatError::AddressOutOfRange {
                            line: line_no,
                            address: address as u32,
                        });
                    }
                    image.insert(address as u8, *byte);
                }
            }
            "9" => break,
            other => {
                return Err(ObjectFormatError::MalformedRecord {
                    line: line_no,
                    message: format!("unknown record type S{}", other),
                })
            }
        }
    }

    Ok(image)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let mut image = Image::new();
        image.insert(0x00, 0x12);
        image.insert(0x01, 0x34);
        image.insert(0x20, 0x56);

        let text = write_srec(&image, "EDU-CPU");
        assert_eq!(read_srec(&text).unwrap(), image);
    }
}
