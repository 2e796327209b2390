//! OPC package rewriting: adds the signature parts, updates
//! `[Content_Types].xml` and `_rels/vbaProject.bin.rels`, and carries the
//! remaining entries through unchanged.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::infra::error::{SigningError, SigningResult};
use crate::services::signing::SignatureVersion;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Empty relationships document used when the input package has no
/// `vbaProject.bin.rels` yet.
const DEFAULT_RELS: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n</Relationships>";

impl SignatureVersion {
    /// Content type registered for the signature part.
    pub fn content_type(self) -> &'static str {
        match self {
            SignatureVersion::V1 => "application/vnd.ms-office.vbaProjectSignature",
            SignatureVersion::Agile => "application/vnd.ms-office.vbaProjectSignatureAgile",
            SignatureVersion::V3 => "application/vnd.ms-office.vbaProjectSignatureV3",
        }
    }

    /// Relationship type linking `vbaProject.bin` to the signature part.
    pub fn relationship_type(self) -> &'static str {
        match self {
            SignatureVersion::V1 => {
                "http://schemas.microsoft.com/office/2006/relationships/vbaProjectSignature"
            }
            SignatureVersion::Agile => {
                "http://schemas.microsoft.com/office/2014/relationships/vbaProjectSignatureAgile"
            }
            SignatureVersion::V3 => {
                "http://schemas.microsoft.com/office/2020/07/relationships/vbaProjectSignatureV3"
            }
        }
    }
}

/// Package layout derived from the document extension.
#[derive(Debug, Clone, Copy)]
pub struct PackagePaths {
    /// Directory holding `vbaProject.bin` inside the ZIP.
    pub vba_root: &'static str,
    /// Extension of the output document.
    pub extension: &'static str,
}

/// Select the VBA root by file extension.
pub fn package_paths(input: &Path) -> SigningResult<PackagePaths> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "docm" => Ok(PackagePaths {
            vba_root: "word",
            extension: "docm",
        }),
        "xlsm" => Ok(PackagePaths {
            vba_root: "xl",
            extension: "xlsm",
        }),
        "pptm" => Ok(PackagePaths {
            vba_root: "ppt",
            extension: "pptm",
        }),
        other => Err(SigningError::InputFormat(format!(
            "unknown file extension: .{other}"
        ))),
    }
}

/// Read `<root>/vbaProject.bin` out of the package.
pub fn read_vba_project_bin(package: &[u8], vba_root: &str) -> SigningResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let name = format!("{vba_root}/vbaProject.bin");
    let mut entry = archive
        .by_name(&name)
        .map_err(|_| SigningError::InputFormat(format!("missing {name}")))?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

/// Rebuild the package with the signature parts first, then the updated
/// rels and content types, then every unchanged entry in input order.
pub fn rewrite_package(
    package: &[u8],
    vba_root: &str,
    parts: &[(SignatureVersion, Vec<u8>)],
) -> SigningResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let versions: Vec<SignatureVersion> = parts.iter().map(|(version, _)| *version).collect();

    for (version, blob) in parts {
        writer.start_file(format!("{vba_root}/{}", version.part_name()), options)?;
        writer.write_all(blob)?;
    }

    let rels_name = format!("{vba_root}/_rels/vbaProject.bin.rels");
    let rels_input = match read_entry(&mut archive, &rels_name) {
        Some(bytes) => bytes,
        None => DEFAULT_RELS.as_bytes().to_vec(),
    };
    let rels_output = add_relationships(&rels_input, &versions)?;
    writer.start_file(&rels_name, options)?;
    writer.write_all(&rels_output)?;

    let content_types_input = read_entry(&mut archive, CONTENT_TYPES_PART).ok_or_else(|| {
        SigningError::InputFormat(format!("missing {CONTENT_TYPES_PART}"))
    })?;
    let content_types_output = add_content_types(&content_types_input, vba_root, &versions)?;
    writer.start_file(CONTENT_TYPES_PART, options)?;
    writer.write_all(&content_types_output)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if name.ends_with("vbaProjectSignature.bin")
            || name.ends_with("vbaProjectSignatureAgile.bin")
            || name.ends_with("vbaProjectSignatureV3.bin")
            || name.ends_with("bin.rels")
            || name.ends_with(CONTENT_TYPES_PART)
        {
            continue;
        }
        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        writer.start_file(name, options)?;
        writer.write_all(&data)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Option<Vec<u8>> {
    let mut entry = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data).ok()?;
    Some(data)
}

// --- [Content_Types].xml -------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Types")]
struct Types {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    #[serde(rename = "Default", default)]
    defaults: Vec<DefaultEntry>,
    #[serde(rename = "Override", default)]
    overrides: Vec<OverrideEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DefaultEntry {
    #[serde(rename = "@Extension")]
    extension: String,
    #[serde(rename = "@ContentType")]
    content_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OverrideEntry {
    #[serde(rename = "@PartName")]
    part_name: String,
    #[serde(rename = "@ContentType")]
    content_type: String,
}

/// Ensure an `<Override>` exists for every produced signature part.
pub fn add_content_types(
    xml: &[u8],
    vba_root: &str,
    versions: &[SignatureVersion],
) -> SigningResult<Vec<u8>> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| SigningError::Xml(format!("content types not UTF-8: {e}")))?;
    let mut types: Types = quick_xml::de::from_str(text)
        .map_err(|e| SigningError::Xml(format!("failed to parse content types: {e}")))?;

    for &version in versions {
        let part_name = format!("/{vba_root}/{}", version.part_name());
        if types
            .overrides
            .iter()
            .any(|entry| entry.part_name == part_name)
        {
            continue;
        }
        types.overrides.push(OverrideEntry {
            part_name,
            content_type: version.content_type().to_string(),
        });
    }

    serialize_document(&types)
}

// --- vbaProject.bin.rels -------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Relationships")]
struct Relationships {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    #[serde(rename = "Relationship", default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Relationship {
    #[serde(rename = "@Id")]
    id: String,
    #[serde(rename = "@Type")]
    relationship_type: String,
    #[serde(rename = "@Target")]
    target: String,
}

/// Ensure a relationship exists for every produced signature part and
/// renumber all ids `rId1..rIdN`.
pub fn add_relationships(xml: &[u8], versions: &[SignatureVersion]) -> SigningResult<Vec<u8>> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| SigningError::Xml(format!("relationships not UTF-8: {e}")))?;
    let mut relationships: Relationships = quick_xml::de::from_str(text)
        .map_err(|e| SigningError::Xml(format!("failed to parse relationships: {e}")))?;

    for &version in versions {
        if relationships
            .relationships
            .iter()
            .any(|rel| rel.target == version.part_name())
        {
            continue;
        }
        relationships.relationships.push(Relationship {
            id: String::new(),
            relationship_type: version.relationship_type().to_string(),
            target: version.part_name().to_string(),
        });
    }

    for (index, relationship) in relationships.relationships.iter_mut().enumerate() {
        relationship.id = format!("rId{}", index + 1);
    }

    serialize_document(&relationships)
}

fn serialize_document<T: Serialize>(value: &T) -> SigningResult<Vec<u8>> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    value
        .serialize(serializer)
        .map_err(|e| SigningError::Xml(format!("failed to serialize XML: {e}")))?;

    let mut out = String::with_capacity(XML_HEADER.len() + body.len());
    out.push_str(XML_HEADER);
    out.push_str(&body);
    Ok(out.into_bytes())
}
