//! File system utility helpers (BOM-aware source readers)
use std::path::Path;

/// Reads a source file as text.
///
/// UTF-16 files are recognised by their BOM; anything that is not valid UTF-8
/// falls back to Windows-1252. A leading UTF-8 BOM is removed.
pub fn read_source_file<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_source(bytes))
}

pub(crate) fn decode_source(bytes: Vec<u8>) -> String {
    let bom = (bytes.first().copied(), bytes.get(1).copied());
    let content = match bom {
        (Some(0xFF), Some(0xFE)) => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16LE.decode(&bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16LE source");
            }
            decoded.into_owned()
        }
        (Some(0xFE), Some(0xFF)) => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16BE.decode(&bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16BE source");
            }
            decoded.into_owned()
        }
        _ => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Source is not valid UTF-8, decoding as Windows-1252");
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
                decoded.into_owned()
            }
        },
    };

    strip_bom(&content).to_string()
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{FEFF}').unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_bom_is_removed() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"int main() {}");
        assert_eq!(decode_source(bytes), "int main() {}");
    }

    #[test]
    fn test_utf16le_source() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "int x;".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_source(bytes), "int x;");
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = vec![b'/', b'/', b' ', 0xE9, b'\n'];
        assert_eq!(decode_source(bytes), "// é\n");
    }
}
