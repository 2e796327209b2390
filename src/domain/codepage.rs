//! MBCS <-> UTF-8 bridge for the project's declared code page.
//!
//! Names inside the dir stream are stored in the project code page (commonly
//! Windows-1252, but e.g. 936 for Simplified Chinese). The numeric code page
//! is authoritative; anything the mapping tables don't know falls back to
//! Windows-1252. Decoded strings are only used as lookup keys -- the
//! normalizers always append the stored bytes untouched.

use encoding_rs::{Encoding, WINDOWS_1252};

/// Resolve a Windows code page number to an encoding, falling back to
/// Windows-1252 for unrecognized pages.
fn encoding_for(code_page: u16) -> &'static Encoding {
    codepage::to_encoding(code_page).unwrap_or(WINDOWS_1252)
}

/// Decode code-page bytes into UTF-8.
pub fn decode(bytes: &[u8], code_page: u16) -> String {
    let (text, _, _) = encoding_for(code_page).decode(bytes);
    text.into_owned()
}

/// Encode a UTF-8 string into code-page bytes.
pub fn encode(text: &str, code_page: u16) -> Vec<u8> {
    let (bytes, _, _) = encoding_for(code_page).encode(text);
    bytes.into_owned()
}

/// Zero-extend each byte to a little-endian u16, producing the fixed-width
/// wide-char sequence the V3 normalization uses for registered libids.
pub fn widen_to_utf16le(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.extend_from_slice(&u16::from(b).to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_windows_1252() {
        // 0xE9 is e-acute in Windows-1252.
        assert_eq!(decode(&[b'M', b'o', b'd', 0xe9], 1252), "Mod\u{e9}");
    }

    #[test]
    fn round_trips_through_declared_code_page() {
        let original = "Tabelle1\u{e4}";
        let encoded = encode(original, 1250);
        assert_eq!(decode(&encoded, 1250), original);
    }

    #[test]
    fn unknown_code_page_falls_back_to_1252() {
        assert_eq!(decode(&[0xe9], 12345), "\u{e9}");
    }

    #[test]
    fn widens_bytes_to_utf16le() {
        assert_eq!(
            widen_to_utf16le(b"AB*"),
            vec![b'A', 0x00, b'B', 0x00, b'*', 0x00]
        );
    }
}
