//! Module stream slicing: each module stream carries an opaque performance
//! cache up to the declared text offset, followed by the compressed source.

use crate::domain::compression::decompress_container;
use crate::infra::error::{SigningError, SigningResult};

/// One VBA module resolved against its OLE streams.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    /// Canonical module name: the dir-stream MBCS name decoded with the
    /// project code page. All lookups use this key.
    pub name: String,
    /// Decompressed source code from the text offset onward.
    pub source: Vec<u8>,
    /// Raw bytes of every OLE stream under a storage named after the module
    /// (forms/designers persist ActiveX state here), in capture order.
    pub child_streams: Vec<ChildStream>,
}

/// A verbatim copy of one child OLE stream.
#[derive(Debug, Clone)]
pub struct ChildStream {
    pub name: String,
    pub path: Vec<String>,
    pub raw: Vec<u8>,
}

/// Slice a module stream at its text offset and decompress the source.
pub fn read_module_source(
    name: &str,
    stream: &[u8],
    text_offset: u32,
) -> SigningResult<Vec<u8>> {
    let offset = text_offset as usize;
    if offset > stream.len() {
        return Err(SigningError::Internal(format!(
            "module {name}: text offset {offset} exceeds stream length {}",
            stream.len()
        )));
    }
    let (source, _) = decompress_container(&stream[offset..])?;
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_literals(data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        for group in data.chunks(8) {
            body.push(0x00);
            body.extend_from_slice(group);
        }
        let mut container = vec![0x01];
        let header = 0xb000 | ((body.len() - 1) as u16 & 0x0fff);
        container.extend_from_slice(&header.to_le_bytes());
        container.extend_from_slice(&body);
        container
    }

    #[test]
    fn skips_performance_cache_before_decompressing() {
        let mut stream = vec![0xaa; 16];
        stream.extend_from_slice(&store_literals(b"Sub Demo()\r\nEnd Sub\r\n"));
        let source = read_module_source("Module1", &stream, 16).unwrap();
        assert_eq!(source, b"Sub Demo()\r\nEnd Sub\r\n");
    }

    #[test]
    fn offset_beyond_stream_fails() {
        let err = read_module_source("Module1", &[0u8; 4], 5).unwrap_err();
        assert!(err.to_string().contains("text offset"));
    }
}
