//! PROJECTINFORMATION section of the dir stream.

use super::*;
use crate::infra::error::{SigningError, SigningResult};

/// Project-information record group (MS-OVBA 2.3.4.2.1).
///
/// String fields hold the stored bytes: MBCS in the project code page for the
/// narrow variants, UTF-16LE for the `_unicode` variants. Their length
/// prefixes are re-derived from the byte lengths when normalizing.
#[derive(Debug, Clone, Default)]
pub struct ProjectInformation {
    pub sys_kind: u32,
    pub compat_version: Option<u32>,
    pub lcid: u32,
    pub lcid_invoke: u32,
    pub code_page: u16,
    pub name: Vec<u8>,
    pub doc_string: Vec<u8>,
    pub doc_string_unicode: Vec<u8>,
    pub help_file_1: Vec<u8>,
    pub help_file_2: Vec<u8>,
    pub help_context: u32,
    pub lib_flags: u32,
    pub version_major: u32,
    pub version_minor: u16,
    pub constants: Vec<u8>,
    pub constants_unicode: Vec<u8>,
}

/// Parse records until PROJECTCONSTANTS (0x000c), which closes the section.
pub(super) fn parse(reader: &mut RecordReader<'_>) -> SigningResult<ProjectInformation> {
    let mut info = ProjectInformation::default();
    loop {
        let id = reader.read_u16("id (record)")?;
        match id {
            ID_SYSKIND => {
                reader.read_u32("SysKind size")?;
                info.sys_kind = reader.read_u32("SysKind")?;
            }
            ID_COMPAT_VERSION => {
                reader.read_u32("CompatVersion size")?;
                info.compat_version = Some(reader.read_u32("CompatVersion")?);
            }
            ID_LCID => {
                reader.read_u32("Lcid size")?;
                info.lcid = reader.read_u32("Lcid")?;
            }
            ID_LCID_INVOKE => {
                reader.read_u32("LcidInvoke size")?;
                info.lcid_invoke = reader.read_u32("LcidInvoke")?;
            }
            ID_CODE_PAGE => {
                reader.read_u32("CodePage size")?;
                info.code_page = reader.read_u16("CodePage")?;
            }
            ID_NAME => {
                info.name = reader.read_sized("ProjectName")?;
            }
            ID_DOC_STRING => {
                info.doc_string = reader.read_sized("DocString")?;
                reader.read_u16("DocString reserved")?;
                info.doc_string_unicode = reader.read_sized("DocStringUnicode")?;
            }
            ID_HELP_FILE_PATH => {
                info.help_file_1 = reader.read_sized("HelpFile1")?;
                reader.read_u16("HelpFilePath reserved")?;
                info.help_file_2 = reader.read_sized("HelpFile2")?;
            }
            ID_HELP_CONTEXT => {
                reader.read_u32("HelpContext size")?;
                info.help_context = reader.read_u32("HelpContext")?;
            }
            ID_LIB_FLAGS => {
                reader.read_u32("LibFlags size")?;
                info.lib_flags = reader.read_u32("LibFlags")?;
            }
            ID_VERSION => {
                reader.read_u32("Version reserved")?;
                info.version_major = reader.read_u32("VersionMajor")?;
                info.version_minor = reader.read_u16("VersionMinor")?;
            }
            ID_CONSTANTS => {
                info.constants = reader.read_sized("Constants")?;
                reader.read_u16("Constants reserved")?;
                info.constants_unicode = reader.read_sized("ConstantsUnicode")?;
                // PROJECTCONSTANTS is the final information record.
                return Ok(info);
            }
            other => {
                return Err(SigningError::DirStream(format!(
                    "unknown project info record id: {other:#06x}"
                )))
            }
        }
    }
}
