//! Forms normalization (MS-OVBA 2.4.2.2): designer storages flattened with
//! block padding, covered by the Agile and V3 signatures.

use crate::domain::module_stream::ModuleSource;
use crate::domain::project::VbaProject;

/// Concatenate the designer-storage normalization of every module listed as
/// a designer module, in module order.
pub fn forms_normalized_data(project: &VbaProject) -> Vec<u8> {
    let mut buffer = Vec::new();
    for module in &project.modules {
        if project
            .project
            .designer_modules
            .iter()
            .any(|name| name == &module.name)
        {
            buffer.extend_from_slice(&normalize_designer_storage(module));
        }
    }
    buffer
}

/// Append each child stream followed by `1023 - (len mod 1023)` zero bytes.
/// A stream whose length is a multiple of 1023 gets a full 1023-byte pad.
pub fn normalize_designer_storage(module: &ModuleSource) -> Vec<u8> {
    let mut buffer = Vec::new();
    for child in &module.child_streams {
        buffer.extend_from_slice(&child.raw);
        let pad = 1023 - child.raw.len() % 1023;
        buffer.resize(buffer.len() + pad, 0);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::module_stream::ChildStream;

    fn module_with_children(lens: &[usize]) -> ModuleSource {
        ModuleSource {
            name: "UserForm1".to_string(),
            source: Vec::new(),
            child_streams: lens
                .iter()
                .enumerate()
                .map(|(i, &len)| ChildStream {
                    name: format!("s{i}"),
                    path: vec!["UserForm1".to_string()],
                    raw: vec![0xcd; len],
                })
                .collect(),
        }
    }

    #[test]
    fn pads_each_child_stream_to_block_boundary() {
        let module = module_with_children(&[10, 1023]);
        let data = normalize_designer_storage(&module);
        // 10 + 1013 pad, then 1023 + a full 1023-byte pad.
        assert_eq!(data.len(), 1023 + 2046);
        assert_eq!(&data[..10], &[0xcd; 10][..]);
        assert!(data[10..1023].iter().all(|&b| b == 0));
        assert!(data[1023 + 1023..].iter().all(|&b| b == 0));
    }
}
