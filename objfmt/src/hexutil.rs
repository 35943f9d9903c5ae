use crate::error::ObjectFormatError;

/// Decodes a run of ASCII hex digits (no leading record marker) into bytes,
/// shared by the Intel HEX and S-record readers.
pub fn decode_hex_bytes(hex: &str, line: usize) -> Result<Vec<u8>, ObjectFormatError> {
    if hex.len() % 2 != 0 {
        return Err(ObjectFormatError::MalformedRecord {
            line,
            message: "odd number of hex digits".to_owned(),
        });
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
            ObjectFormatError::MalformedRecord {
                line,
                message: "invalid hex digit".to_owned(),
            }
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}
