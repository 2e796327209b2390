//! The two module-source line dialects used by the normalizations.
//!
//! V1/Agile and V3 deliberately split lines differently; the behaviours come
//! from distinct reference algorithms and must not be unified.

/// V1/Agile dialect: a CR terminates a line, a stand-alone LF terminates a
/// line, an LF following a CR is dropped, and the residual buffer is emitted
/// as a final line at end of input.
pub fn split_lines_v1(text: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut previous = 0u8;
    for &byte in text {
        if byte == 0x0d || (byte == 0x0a && previous != 0x0d) {
            lines.push(std::mem::take(&mut buffer));
        } else if byte != 0x0a {
            buffer.push(byte);
        }
        previous = byte;
    }
    lines.push(buffer);
    lines
}

/// V3 dialect: a line boundary occurs at a CR or LF whose predecessor was a
/// CR. All CR/LF bytes are line-break skeleton and never reach the line
/// content; no residual line is emitted at end of input.
pub fn split_lines_v3(text: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut previous = 0u8;
    for &byte in text {
        if byte == 0x0a || byte == 0x0d {
            if previous == 0x0d {
                lines.push(std::mem::take(&mut buffer));
            }
        } else {
            buffer.push(byte);
        }
        previous = byte;
    }
    lines
}

/// Case-insensitive ASCII prefix test used by the attribute filters.
pub fn starts_with_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}
