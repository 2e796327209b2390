//! Builds the in-memory [`VbaProject`] from a `vbaProject.bin` OLE compound
//! file: dir stream, `PROJECT` stream, per-module sources, and the child
//! streams captured for designer modules.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use cfb::CompoundFile;

use crate::domain::codepage;
use crate::domain::compression::decompress_container;
use crate::domain::dir::parse_dir_stream;
use crate::domain::module_stream::{read_module_source, ChildStream, ModuleSource};
use crate::domain::project::VbaProject;
use crate::domain::project_stream::parse_project_stream;
use crate::infra::error::{SigningError, SigningResult};

struct OleStream {
    /// Path components, e.g. `["VBA", "Module1"]`.
    components: Vec<String>,
    raw: Vec<u8>,
}

/// Parse the OLE container and resolve the full project model.
pub fn parse_vba_project(data: &[u8]) -> SigningResult<VbaProject> {
    let streams = read_streams(data)?;

    let mut by_path: HashMap<String, usize> = HashMap::new();
    for (index, stream) in streams.iter().enumerate() {
        let full_name = stream.components.join("/");
        if by_path.insert(full_name.clone(), index).is_some() {
            return Err(SigningError::Internal(format!(
                "duplicate stream name: {full_name}"
            )));
        }
    }

    let dir_bytes = streams
        .iter()
        .find(|stream| stream.components.last().map(String::as_str) == Some("dir"))
        .map(|stream| stream.raw.as_slice())
        .ok_or_else(|| SigningError::InputFormat("missing dir stream".to_string()))?;
    let (dir_decompressed, _) = decompress_container(dir_bytes)?;
    let dir = parse_dir_stream(&dir_decompressed)?;
    log::debug!(
        "parsed dir stream: {} references, {} modules, code page {}",
        dir.references.len(),
        dir.modules.modules.len(),
        dir.information.code_page
    );

    let code_page = dir.information.code_page;
    let project = streams
        .iter()
        .find(|stream| stream.components.last().map(String::as_str) == Some("PROJECT"))
        .map(|stream| parse_project_stream(&stream.raw, code_page))
        .unwrap_or_default();

    let mut modules = Vec::with_capacity(dir.modules.modules.len());
    for module in &dir.modules.modules {
        let name = codepage::decode(&module.name, code_page);
        let index = by_path.get(&format!("VBA/{name}")).ok_or_else(|| {
            SigningError::Internal(format!("module {name} referenced by dir but absent from OLE"))
        })?;
        let source = read_module_source(&name, &streams[*index].raw, module.text_offset)?;
        modules.push(ModuleSource {
            name,
            source,
            child_streams: Vec::new(),
        });
    }

    // Capture form/designer persistence: every stream inside a storage named
    // after a module belongs to that module, in stream-walk order.
    for stream in &streams {
        let (storage_components, name) = match stream.components.split_last() {
            Some((name, parents)) => (parents, name.clone()),
            None => continue,
        };
        for module in &mut modules {
            if storage_components.iter().any(|part| part == &module.name) {
                module.child_streams.push(ChildStream {
                    name: name.clone(),
                    path: storage_components.to_vec(),
                    raw: stream.raw.clone(),
                });
            }
        }
    }

    Ok(VbaProject {
        dir,
        project,
        modules,
    })
}

/// Enumerate and read every non-empty stream in the compound file.
fn read_streams(data: &[u8]) -> SigningResult<Vec<OleStream>> {
    let cursor = Cursor::new(data);
    let mut compound = CompoundFile::open(cursor)
        .map_err(|e| SigningError::InputFormat(format!("failed to open OLE container: {e}")))?;

    let entries: Vec<std::path::PathBuf> = compound
        .walk()
        .filter(|entry| entry.is_stream() && entry.len() > 0)
        .map(|entry| entry.path().to_path_buf())
        .collect();

    let mut streams = Vec::with_capacity(entries.len());
    for path in entries {
        let mut stream = compound
            .open_stream(&path)
            .map_err(|e| SigningError::InputFormat(format!("failed to open stream: {e}")))?;
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw)?;

        let components = path
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(name) => {
                    Some(name.to_string_lossy().into_owned())
                }
                _ => None,
            })
            .collect();
        streams.push(OleStream { components, raw });
    }
    Ok(streams)
}
