//! PROJECTREFERENCES section of the dir stream.
//!
//! References are composite: each begins with a REFERENCENAME record; the
//! record id that follows selects the variant. An ORIGINAL reference embeds a
//! full CONTROL reference, and a CONTROL reference may carry a second name
//! record (the "extended" name) in the middle of its payload.

use super::*;
use crate::infra::error::{SigningError, SigningResult};

/// REFERENCENAME record: MBCS name plus its UTF-16LE twin.
#[derive(Debug, Clone, Default)]
pub struct ReferenceName {
    pub name: Vec<u8>,
    pub name_unicode: Vec<u8>,
}

/// One project reference: name record plus the variant body, in on-wire order.
#[derive(Debug, Clone)]
pub struct Reference {
    pub name: ReferenceName,
    pub kind: ReferenceKind,
}

#[derive(Debug, Clone)]
pub enum ReferenceKind {
    Registered(ReferenceRegistered),
    Project(ReferenceProject),
    Control(ReferenceControl),
    Original(ReferenceOriginal),
}

/// REFERENCEREGISTERED: a type library registered on the machine.
#[derive(Debug, Clone)]
pub struct ReferenceRegistered {
    pub libid: Vec<u8>,
}

/// REFERENCEPROJECT: a sibling VBA project.
#[derive(Debug, Clone)]
pub struct ReferenceProject {
    pub libid_absolute: Vec<u8>,
    pub libid_relative: Vec<u8>,
    pub major_version: u32,
    pub minor_version: u16,
}

/// REFERENCECONTROL: an ActiveX control, with twiddled and extended libids.
#[derive(Debug, Clone)]
pub struct ReferenceControl {
    pub libid_twiddled: Vec<u8>,
    pub name_extended: Option<ReferenceName>,
    pub libid_extended: Vec<u8>,
    pub original_type_lib: [u8; 16],
    pub cookie: u32,
}

/// REFERENCEORIGINAL: the original libid of a control reference.
#[derive(Debug, Clone)]
pub struct ReferenceOriginal {
    pub libid_original: Vec<u8>,
    pub control: ReferenceControl,
}

/// Parse references until the modules marker (0x000f). The marker id is
/// consumed; the modules parser continues with the record payload.
pub(super) fn parse(reader: &mut RecordReader<'_>) -> SigningResult<Vec<Reference>> {
    let mut references = Vec::new();
    let mut pending_name: Option<ReferenceName> = None;
    loop {
        let id = reader.read_u16("id (reference)")?;
        match id {
            ID_REFERENCE_NAME => {
                pending_name = Some(parse_name_record(reader)?);
            }
            ID_REFERENCE_CONTROL => {
                let control = parse_control_record(reader)?;
                references.push(Reference {
                    name: take_name(&mut pending_name)?,
                    kind: ReferenceKind::Control(control),
                });
            }
            ID_REFERENCE_REGISTERED => {
                reader.read_u32("Registered size")?;
                let libid = reader.read_sized("Libid")?;
                reader.read_u32("Registered reserved1")?;
                reader.read_u16("Registered reserved2")?;
                references.push(Reference {
                    name: take_name(&mut pending_name)?,
                    kind: ReferenceKind::Registered(ReferenceRegistered { libid }),
                });
            }
            ID_REFERENCE_ORIGINAL => {
                let libid_original = reader.read_sized("LibidOriginal")?;
                // The embedded control record repeats its own id.
                reader.read_u16("embedded control id")?;
                let control = parse_control_record(reader)?;
                references.push(Reference {
                    name: take_name(&mut pending_name)?,
                    kind: ReferenceKind::Original(ReferenceOriginal {
                        libid_original,
                        control,
                    }),
                });
            }
            ID_REFERENCE_PROJECT => {
                reader.read_u32("Project size")?;
                let libid_absolute = reader.read_sized("LibidAbsolute")?;
                let libid_relative = reader.read_sized("LibidRelative")?;
                let major_version = reader.read_u32("MajorVersion")?;
                let minor_version = reader.read_u16("MinorVersion")?;
                references.push(Reference {
                    name: take_name(&mut pending_name)?,
                    kind: ReferenceKind::Project(ReferenceProject {
                        libid_absolute,
                        libid_relative,
                        major_version,
                        minor_version,
                    }),
                });
            }
            ID_MODULES => return Ok(references),
            other => {
                return Err(SigningError::DirStream(format!(
                    "unknown project reference record id: {other:#06x}"
                )))
            }
        }
    }
}

fn take_name(pending: &mut Option<ReferenceName>) -> SigningResult<ReferenceName> {
    pending.take().ok_or_else(|| {
        SigningError::DirStream("reference record without preceding name record".to_string())
    })
}

pub(super) fn parse_name_record(reader: &mut RecordReader<'_>) -> SigningResult<ReferenceName> {
    let name = reader.read_sized("reference name")?;
    reader.read_u16("reference name reserved")?;
    let name_unicode = reader.read_sized("reference name unicode")?;
    Ok(ReferenceName { name, name_unicode })
}

fn parse_control_record(reader: &mut RecordReader<'_>) -> SigningResult<ReferenceControl> {
    reader.read_u32("SizeTwiddled")?;
    let libid_twiddled = reader.read_sized("LibidTwiddled")?;
    reader.read_u32("Control reserved1")?;
    reader.read_u16("Control reserved2")?;

    // The next u16 is either the Reserved3 marker (no extended name) or the
    // id of an embedded name record followed by Reserved3.
    let marker = reader.read_u16("Control name marker")?;
    let name_extended = if marker == RESERVED_CONTROL_EXTENDED {
        None
    } else {
        let name = parse_name_record(reader)?;
        reader.read_u16("Control reserved3")?;
        Some(name)
    };

    reader.read_u32("SizeExtended")?;
    let libid_extended = reader.read_sized("LibidExtended")?;
    reader.read_u32("Control reserved4")?;
    reader.read_u16("Control reserved5")?;
    let type_lib = reader.read_bytes(16, "OriginalTypeLib")?;
    let mut original_type_lib = [0u8; 16];
    original_type_lib.copy_from_slice(&type_lib);
    let cookie = reader.read_u32("Control cookie")?;

    Ok(ReferenceControl {
        libid_twiddled,
        name_extended,
        libid_extended,
        original_type_lib,
        cookie,
    })
}
