//! V3 content and project normalization (MS-OVBA 2.4.2.5 / 2.4.2.6).
//!
//! The V3 content normalization re-emits the dir records with fixed values
//! for most constants and project-supplied values for the size-prefixed
//! payloads, then filters module source against the built-in default
//! attributes. The project normalization appends selected `PROJECT` stream
//! properties and designer storages.

use crate::domain::codepage;
use crate::domain::dir::{
    Reference, ReferenceControl, ReferenceKind, ReferenceName, ID_CONSTANTS, ID_DIR_TERMINATOR,
    ID_DOC_STRING, ID_HELP_CONTEXT, ID_HELP_FILE_PATH, ID_LCID, ID_LCID_INVOKE, ID_LIB_FLAGS,
    ID_MODULES, ID_MODULE_PRIVATE, ID_MODULE_READ_ONLY, ID_MODULE_TYPE_PROCEDURAL, ID_NAME,
    ID_PROJECT_COOKIE, ID_REFERENCE_CONTROL, ID_REFERENCE_NAME, ID_REFERENCE_ORIGINAL,
    ID_REFERENCE_PROJECT, ID_REFERENCE_REGISTERED, ID_SYSKIND, ID_VERSION, ID_CODE_PAGE,
    RESERVED_CONSTANTS, RESERVED_CONTROL_EXTENDED, RESERVED_DOC_STRING, RESERVED_HELP_FILE_PATH,
    RESERVED_REFERENCE_NAME,
};
use crate::domain::normalize::forms::normalize_designer_storage;
use crate::domain::normalize::lines::{split_lines_v3, starts_with_ignore_case};
use crate::domain::project::VbaProject;
use crate::infra::error::{SigningError, SigningResult};

/// The built-in attribute lines excluded from the V3 source normalization.
const DEFAULT_ATTRIBUTES: [&[u8]; 7] = [
    b"Attribute VB_Base = \"0{00020820-0000-0000-C000-000000000046}\"",
    b"Attribute VB_GlobalNameSpace = False",
    b"Attribute VB_Creatable = False",
    b"Attribute VB_PredeclaredId = True",
    b"Attribute VB_Exposed = True",
    b"Attribute VB_TemplateDerived = False",
    b"Attribute VB_Customizable = True",
];

fn push_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn push_size_of(buffer: &mut Vec<u8>, bytes: &[u8]) {
    push_u32(buffer, bytes.len() as u32);
}

/// Build the `V3ContentNormalizedData` buffer.
pub fn content_normalized_data_v3(project: &VbaProject) -> SigningResult<Vec<u8>> {
    let info = &project.dir.information;
    let mut buffer = Vec::new();

    push_u16(&mut buffer, ID_SYSKIND);
    push_u32(&mut buffer, 0x0000_0004);
    push_u16(&mut buffer, ID_LCID);
    push_u32(&mut buffer, 0x0000_0004);
    push_u32(&mut buffer, 0x0000_0409);
    push_u16(&mut buffer, ID_LCID_INVOKE);
    push_u32(&mut buffer, 0x0000_0004);
    push_u32(&mut buffer, 0x0000_0409);
    push_u16(&mut buffer, ID_CODE_PAGE);
    push_u32(&mut buffer, 0x0000_0002);

    push_u16(&mut buffer, ID_NAME);
    push_size_of(&mut buffer, &info.name);
    buffer.extend_from_slice(&info.name);

    push_u16(&mut buffer, ID_DOC_STRING);
    push_size_of(&mut buffer, &info.doc_string);
    push_u16(&mut buffer, RESERVED_DOC_STRING);
    push_size_of(&mut buffer, &info.doc_string_unicode);

    push_u16(&mut buffer, ID_HELP_FILE_PATH);
    push_size_of(&mut buffer, &info.help_file_1);
    push_u16(&mut buffer, RESERVED_HELP_FILE_PATH);
    push_size_of(&mut buffer, &info.help_file_2);

    push_u16(&mut buffer, ID_HELP_CONTEXT);
    push_u32(&mut buffer, 0x0000_0004);

    push_u16(&mut buffer, ID_LIB_FLAGS);
    push_u32(&mut buffer, 0x0000_0004);
    push_u32(&mut buffer, 0x0000_0000);

    push_u16(&mut buffer, ID_VERSION);
    push_u32(&mut buffer, 0x0000_0004);
    push_u32(&mut buffer, info.version_major);
    push_u16(&mut buffer, info.version_minor);

    push_u16(&mut buffer, ID_CONSTANTS);
    push_size_of(&mut buffer, &info.constants);
    buffer.extend_from_slice(&info.constants);
    push_u16(&mut buffer, RESERVED_CONSTANTS);
    push_size_of(&mut buffer, &info.constants_unicode);
    buffer.extend_from_slice(&info.constants_unicode);

    for reference in &project.dir.references {
        write_reference(&mut buffer, reference);
    }

    // Modules marker and project cookie, both with fixed sizes.
    push_u16(&mut buffer, ID_MODULES);
    push_u32(&mut buffer, 0x0000_0002);
    push_u16(&mut buffer, ID_PROJECT_COOKIE);
    push_u32(&mut buffer, 0x0000_0002);

    let code_page = info.code_page;
    for module in &project.dir.modules.modules {
        if module.type_id == ID_MODULE_TYPE_PROCEDURAL {
            push_u16(&mut buffer, ID_MODULE_TYPE_PROCEDURAL);
            push_u32(&mut buffer, 0x0000_0000);
        }
        if module.read_only {
            push_u16(&mut buffer, ID_MODULE_READ_ONLY);
            push_u32(&mut buffer, 0x0000_0000);
        }
        if module.private {
            push_u16(&mut buffer, ID_MODULE_PRIVATE);
            push_u32(&mut buffer, 0x0000_0000);
        }

        let module_name = codepage::decode(&module.name, code_page);
        let source = project
            .module_source(&module_name)
            .ok_or_else(|| {
                SigningError::Internal(format!("unknown module: {module_name}"))
            })?;

        let mut hash_module_name = false;
        for line in split_lines_v3(&source.source) {
            if !starts_with_ignore_case(&line, b"attribute") {
                hash_module_name = true;
                buffer.extend_from_slice(&line);
                buffer.push(0x0a);
            } else if starts_with_ignore_case(&line, b"attribute vb_name = ") {
                continue;
            } else if !DEFAULT_ATTRIBUTES.contains(&line.as_slice()) {
                hash_module_name = true;
                buffer.extend_from_slice(&line);
                buffer.push(0x0a);
            }
        }

        if hash_module_name {
            match &module.name_unicode {
                Some(unicode) if !unicode.is_empty() => buffer.extend_from_slice(unicode),
                _ => buffer.extend_from_slice(&module.name),
            }
            buffer.push(0x0a);
        }
    }

    push_u16(&mut buffer, ID_DIR_TERMINATOR);
    push_u32(&mut buffer, 0x0000_0000);
    Ok(buffer)
}

fn write_reference(buffer: &mut Vec<u8>, reference: &Reference) {
    push_u16(buffer, ID_REFERENCE_NAME);
    push_size_of(buffer, &reference.name.name);
    buffer.extend_from_slice(&reference.name.name);
    push_u16(buffer, RESERVED_REFERENCE_NAME);
    push_size_of(buffer, &reference.name.name_unicode);
    buffer.extend_from_slice(&reference.name.name_unicode);

    match &reference.kind {
        ReferenceKind::Control(control) => write_control_reference(buffer, control),
        ReferenceKind::Original(original) => {
            push_u16(buffer, ID_REFERENCE_ORIGINAL);
            push_size_of(buffer, &original.libid_original);
            buffer.extend_from_slice(&original.libid_original);
            write_control_reference(buffer, &original.control);
        }
        ReferenceKind::Registered(registered) => {
            push_u16(buffer, ID_REFERENCE_REGISTERED);
            // The declared size is the MBCS byte count even though the libid
            // is emitted as a widened wide-char sequence.
            push_size_of(buffer, &registered.libid);
            buffer.extend_from_slice(&codepage::widen_to_utf16le(&registered.libid));
            push_u32(buffer, 0x0000_0000);
            push_u16(buffer, 0x0000);
        }
        ReferenceKind::Project(body) => {
            push_u16(buffer, ID_REFERENCE_PROJECT);
            push_size_of(buffer, &body.libid_absolute);
            buffer.extend_from_slice(&body.libid_absolute);
            push_size_of(buffer, &body.libid_relative);
            buffer.extend_from_slice(&body.libid_relative);
            push_u32(buffer, body.major_version);
            push_u16(buffer, body.minor_version);
        }
    }
}

fn write_control_reference(buffer: &mut Vec<u8>, control: &ReferenceControl) {
    push_u16(buffer, ID_REFERENCE_CONTROL);
    push_size_of(buffer, &control.libid_twiddled);
    buffer.extend_from_slice(&control.libid_twiddled);
    push_u32(buffer, 0x0000_0000);
    push_u16(buffer, 0x0000);

    if let Some(extended) = &control.name_extended {
        write_extended_name(buffer, extended);
    }

    push_u16(buffer, RESERVED_CONTROL_EXTENDED);
    push_size_of(buffer, &control.libid_extended);
    buffer.extend_from_slice(&control.libid_extended);
    push_u32(buffer, 0x0000_0000);
    push_u16(buffer, 0x0000);
    buffer.extend_from_slice(&control.original_type_lib);
    push_u32(buffer, control.cookie);
}

fn write_extended_name(buffer: &mut Vec<u8>, extended: &ReferenceName) {
    push_u16(buffer, ID_REFERENCE_NAME);
    push_size_of(buffer, &extended.name);
    buffer.extend_from_slice(&extended.name);
    // The UTF-16 sub-record is emitted only when the extended name actually
    // carries one.
    if !extended.name_unicode.is_empty() {
        push_u16(buffer, RESERVED_REFERENCE_NAME);
        push_size_of(buffer, &extended.name_unicode);
        buffer.extend_from_slice(&extended.name_unicode);
    }
}

/// Build the `ProjectNormalizedData` buffer appended after the V3 content.
pub fn project_normalized_data(project: &VbaProject) -> SigningResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let code_page = project.code_page();

    for property in &project.project.main_properties {
        if property.key == b"BaseClass" {
            let designer_name = codepage::decode(&property.value, code_page);
            let module = project.module_source(&designer_name).ok_or_else(|| {
                SigningError::Internal(format!("unknown designer module: {designer_name}"))
            })?;
            buffer.extend_from_slice(&normalize_designer_storage(module));
        }
        let excluded = matches!(
            property.key.as_slice(),
            b"ID" | b"Document" | b"CMG" | b"DPB" | b"GC"
        );
        if !excluded && !property.key.starts_with(b"&H") {
            buffer.extend_from_slice(&property.key);
            buffer.extend_from_slice(&property.value);
        }
    }

    if contains_subslice(&project.project.raw, b"Host Extender Info") {
        buffer.extend_from_slice(b"Host Extender Info");
        for property in &project.project.host_extender_properties {
            if property.key.starts_with(b"&H") {
                buffer.extend_from_slice(&property.line);
            }
        }
    }

    Ok(buffer)
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
