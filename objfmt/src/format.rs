use std::path::Path;

/// One of the three object-file formats EDU-CPU understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Bin,
    Hex,
    SRec,
}

/// Detects format from a file extension, if it names one of the three.
pub fn detect_by_extension(path: &Path) -> Option<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("bin") => Some(Format::Bin),
        Some("hex") => Some(Format::Hex),
        Some("srec") => Some(Format::SRec),
        _ => None,
    }
}

/// Detects format by the first non-whitespace byte: `:` is Intel HEX, `S`
/// is S-record, anything else is treated as raw binary.
pub fn detect_by_content(bytes: &[u8]) -> Format {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b':') => Format::Hex,
        Some(b'S') => Format::SRec,
        _ => Format::Bin,
    }
}

/// Extension first, then content — the autodetection order §4.4 specifies.
pub fn detect(path: &Path, bytes: &[u8]) -> Format {
    detect_by_extension(path).unwrap_or_else(|| detect_by_content(bytes))
}
