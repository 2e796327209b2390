//! PROJECTMODULES section of the dir stream.

use super::*;
use crate::infra::error::{SigningError, SigningResult};

/// PROJECTMODULES record group: project cookie plus the MODULE records.
#[derive(Debug, Clone, Default)]
pub struct ProjectModules {
    pub cookie: u16,
    pub modules: Vec<Module>,
}

/// One MODULE record group.
///
/// `name`/`stream_name`/`doc_string` hold the stored MBCS bytes; the
/// `_unicode` twins hold UTF-16LE. `type_id` is 0x0021 (procedural) or
/// 0x0022 (document, class, or designer).
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: Vec<u8>,
    pub name_unicode: Option<Vec<u8>>,
    pub stream_name: Vec<u8>,
    pub stream_name_unicode: Vec<u8>,
    pub doc_string: Vec<u8>,
    pub doc_string_unicode: Vec<u8>,
    pub text_offset: u32,
    pub help_context: u32,
    pub cookie: u16,
    pub type_id: u16,
    pub read_only: bool,
    pub private: bool,
}

/// Parse the modules section: size, count, PROJECTCOOKIE, then exactly
/// `count` module record groups, each committed by its terminator record.
pub(super) fn parse(reader: &mut RecordReader<'_>) -> SigningResult<ProjectModules> {
    let mut modules = ProjectModules::default();

    reader.read_u32("Modules size")?;
    let count = reader.read_u16("Modules count")?;

    let cookie_id = reader.read_u16("ProjectCookie id")?;
    if cookie_id != ID_PROJECT_COOKIE {
        return Err(SigningError::DirStream(format!(
            "invalid id for project cookie: {cookie_id:#06x}"
        )));
    }
    reader.read_u32("ProjectCookie size")?;
    modules.cookie = reader.read_u16("ProjectCookie")?;

    let mut current = Module::default();
    while modules.modules.len() < usize::from(count) {
        let id = reader.read_u16("id (module)")?;
        match id {
            ID_MODULE_NAME => {
                current = Module {
                    name: reader.read_sized("ModuleName")?,
                    ..Module::default()
                };
            }
            ID_MODULE_NAME_UNICODE => {
                current.name_unicode = Some(reader.read_sized("ModuleNameUnicode")?);
            }
            ID_MODULE_STREAM_NAME => {
                current.stream_name = reader.read_sized("StreamName")?;
                let reserved = reader.read_u16("StreamName reserved")?;
                if reserved != RESERVED_MODULE_STREAM_NAME {
                    return Err(SigningError::DirStream(format!(
                        "reserved constant of MODULESTREAM record incorrect: {reserved:#06x}"
                    )));
                }
                current.stream_name_unicode = reader.read_sized("StreamNameUnicode")?;
            }
            ID_MODULE_DOC_STRING => {
                current.doc_string = reader.read_sized("ModuleDocString")?;
                reader.read_u16("ModuleDocString reserved")?;
                current.doc_string_unicode = reader.read_sized("ModuleDocStringUnicode")?;
            }
            ID_MODULE_OFFSET => {
                reader.read_u32("ModuleOffset size")?;
                current.text_offset = reader.read_u32("TextOffset")?;
            }
            ID_MODULE_HELP_CONTEXT => {
                reader.read_u32("ModuleHelpContext size")?;
                current.help_context = reader.read_u32("ModuleHelpContext")?;
            }
            ID_MODULE_COOKIE => {
                reader.read_u32("ModuleCookie size")?;
                current.cookie = reader.read_u16("ModuleCookie")?;
            }
            ID_MODULE_TYPE_PROCEDURAL | ID_MODULE_TYPE_DOCUMENT => {
                current.type_id = id;
                reader.read_u32("ModuleType reserved")?;
            }
            ID_MODULE_READ_ONLY => {
                current.read_only = true;
                reader.read_u32("ModuleReadOnly reserved")?;
            }
            ID_MODULE_PRIVATE => {
                current.private = true;
                reader.read_u32("ModulePrivate reserved")?;
            }
            ID_MODULE_TERMINATOR => {
                reader.read_u32("Module terminator reserved")?;
                modules.modules.push(std::mem::take(&mut current));
            }
            other => {
                return Err(SigningError::DirStream(format!(
                    "unknown module record id: {other:#06x}"
                )))
            }
        }
    }
    Ok(modules)
}
