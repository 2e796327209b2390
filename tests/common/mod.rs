//! Shared fixture builders: synthetic compressed containers, dir streams,
//! OLE containers, macro-enabled packages, and throwaway signing identities.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn push_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn push_sized(buf: &mut Vec<u8>, bytes: &[u8]) {
    push_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

pub fn utf16le(ascii: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(ascii.len() * 2);
    for unit in ascii.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Wrap raw bytes in a CompressedContainer using literal-only token groups.
pub fn store_compressed(data: &[u8]) -> Vec<u8> {
    let mut container = vec![0x01];
    // 400 groups of 8 literals per chunk keeps the body within 4096 bytes.
    for chunk in data.chunks(3200) {
        let mut body = Vec::with_capacity(chunk.len() + chunk.len() / 8 + 1);
        for group in chunk.chunks(8) {
            body.push(0x00);
            body.extend_from_slice(group);
        }
        let header = 0xb000u16 | ((body.len() - 1) as u16 & 0x0fff);
        container.extend_from_slice(&header.to_le_bytes());
        container.extend_from_slice(&body);
    }
    container
}

/// One module in a synthetic project.
pub struct ModuleFixture {
    pub name: &'static str,
    pub source: Vec<u8>,
    /// Bytes preceding the compressed source in the module stream.
    pub prologue: Vec<u8>,
    /// 0x0021 procedural, 0x0022 document/class/designer.
    pub type_id: u16,
}

impl ModuleFixture {
    pub fn document(name: &'static str, source: &[u8]) -> Self {
        Self {
            name,
            source: source.to_vec(),
            prologue: Vec::new(),
            type_id: 0x0022,
        }
    }

    pub fn procedural(name: &'static str, source: &[u8]) -> Self {
        Self {
            name,
            source: source.to_vec(),
            prologue: vec![0xaa; 7],
            type_id: 0x0021,
        }
    }
}

/// Build a decompressed dir stream for the given modules.
pub fn build_dir_stream(project_name: &[u8], constants: &[u8], modules: &[ModuleFixture]) -> Vec<u8> {
    let mut buf = Vec::new();

    push_u16(&mut buf, 0x0001); // SysKind
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 1);
    push_u16(&mut buf, 0x0002); // Lcid
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 0x0409);
    push_u16(&mut buf, 0x0014); // LcidInvoke
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 0x0409);
    push_u16(&mut buf, 0x0003); // CodePage
    push_u32(&mut buf, 2);
    push_u16(&mut buf, 1252);
    push_u16(&mut buf, 0x0004); // Name
    push_sized(&mut buf, project_name);
    push_u16(&mut buf, 0x0005); // DocString
    push_sized(&mut buf, b"");
    push_u16(&mut buf, 0x0040);
    push_sized(&mut buf, b"");
    push_u16(&mut buf, 0x0006); // HelpFilePath
    push_sized(&mut buf, b"");
    push_u16(&mut buf, 0x003d);
    push_sized(&mut buf, b"");
    push_u16(&mut buf, 0x0007); // HelpContext
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 0);
    push_u16(&mut buf, 0x0008); // LibFlags
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 0);
    push_u16(&mut buf, 0x0009); // Version
    push_u32(&mut buf, 4);
    push_u32(&mut buf, 1);
    push_u16(&mut buf, 7);
    push_u16(&mut buf, 0x000c); // Constants
    push_sized(&mut buf, constants);
    push_u16(&mut buf, 0x003c);
    push_sized(&mut buf, b"");

    // One registered reference (stdole), as every real project carries.
    push_u16(&mut buf, 0x0016);
    push_sized(&mut buf, b"stdole");
    push_u16(&mut buf, 0x003e);
    push_sized(&mut buf, &utf16le("stdole"));
    push_u16(&mut buf, 0x000d);
    let libid: &[u8] = b"*\\G{00020430-0000-0000-C000-000000000046}#2.0#0#stdole2.tlb#OLE";
    push_u32(&mut buf, (libid.len() + 10) as u32);
    push_sized(&mut buf, libid);
    push_u32(&mut buf, 0);
    push_u16(&mut buf, 0);

    push_u16(&mut buf, 0x000f); // modules marker
    push_u32(&mut buf, 2);
    push_u16(&mut buf, modules.len() as u16);
    push_u16(&mut buf, 0x0013); // project cookie
    push_u32(&mut buf, 2);
    push_u16(&mut buf, 0xffff);

    for module in modules {
        push_u16(&mut buf, 0x0019);
        push_sized(&mut buf, module.name.as_bytes());
        push_u16(&mut buf, 0x0047);
        push_sized(&mut buf, &utf16le(module.name));
        push_u16(&mut buf, 0x001a);
        push_sized(&mut buf, module.name.as_bytes());
        push_u16(&mut buf, 0x0032);
        push_sized(&mut buf, &utf16le(module.name));
        push_u16(&mut buf, 0x001c);
        push_sized(&mut buf, b"");
        push_u16(&mut buf, 0x0048);
        push_sized(&mut buf, b"");
        push_u16(&mut buf, 0x0031);
        push_u32(&mut buf, 4);
        push_u32(&mut buf, module.prologue.len() as u32);
        push_u16(&mut buf, 0x001e);
        push_u32(&mut buf, 4);
        push_u32(&mut buf, 0);
        push_u16(&mut buf, 0x002c);
        push_u32(&mut buf, 2);
        push_u16(&mut buf, 0xffff);
        push_u16(&mut buf, module.type_id);
        push_u32(&mut buf, 0);
        push_u16(&mut buf, 0x002b);
        push_u32(&mut buf, 0);
    }

    push_u16(&mut buf, 0x0010);
    push_u32(&mut buf, 0);
    buf
}

/// Build a `vbaProject.bin` OLE container: `VBA/dir`, `VBA/<module>` streams,
/// the `PROJECT` stream, and optional designer child streams.
pub fn build_vba_project_bin(
    project_stream: &[u8],
    modules: &[ModuleFixture],
    designer_children: &[(&str, &str, Vec<u8>)],
) -> Vec<u8> {
    let dir = build_dir_stream(b"VBAProject", b"", modules);

    let mut compound = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    compound.create_storage("/VBA").unwrap();
    {
        let mut stream = compound.create_stream("/VBA/dir").unwrap();
        stream.write_all(&store_compressed(&dir)).unwrap();
        stream.flush().unwrap();
    }
    {
        let mut stream = compound.create_stream("/PROJECT").unwrap();
        stream.write_all(project_stream).unwrap();
        stream.flush().unwrap();
    }
    for module in modules {
        let mut bytes = module.prologue.clone();
        bytes.extend_from_slice(&store_compressed(&module.source));
        let mut stream = compound
            .create_stream(format!("/VBA/{}", module.name))
            .unwrap();
        stream.write_all(&bytes).unwrap();
        stream.flush().unwrap();
    }
    for (storage, name, raw) in designer_children {
        let path = format!("/{storage}");
        if !compound.exists(&path) {
            compound.create_storage(&path).unwrap();
        }
        let mut stream = compound.create_stream(format!("/{storage}/{name}")).unwrap();
        stream.write_all(raw).unwrap();
        stream.flush().unwrap();
    }
    compound.into_inner().into_inner()
}

pub const CONTENT_TYPES_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"bin\" ContentType=\"application/vnd.ms-office.vbaProject\"/><Default Extension=\"xml\" ContentType=\"application/xml\"/><Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.ms-excel.sheet.macroEnabled.main+xml\"/></Types>";

/// Assemble a minimal `.xlsm` package around the given `vbaProject.bin`.
pub fn build_xlsm(vba_project_bin: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file(CONTENT_TYPES_PART, options).unwrap();
    writer.write_all(CONTENT_TYPES_XML.as_bytes()).unwrap();

    writer.start_file("xl/workbook.xml", options).unwrap();
    writer
        .write_all(b"<?xml version=\"1.0\"?><workbook/>")
        .unwrap();

    writer.start_file("xl/vbaProject.bin", options).unwrap();
    writer.write_all(vba_project_bin).unwrap();

    writer.finish().unwrap().into_inner()
}

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// A throwaway self-signed RSA identity.
pub struct TestIdentity {
    pub certificate: X509,
    pub private_key: PKey<Private>,
}

impl TestIdentity {
    pub fn generate() -> Self {
        let rsa = Rsa::generate(2048).unwrap();
        let private_key = PKey::from_rsa(rsa).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "VBA Test Signer").unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(1).unwrap())
            .unwrap();
        builder.set_pubkey(&private_key).unwrap();
        builder.sign(&private_key, MessageDigest::sha256()).unwrap();

        Self {
            certificate: builder.build(),
            private_key,
        }
    }

    pub fn certificate_pem(&self) -> Vec<u8> {
        self.certificate.to_pem().unwrap()
    }

    pub fn private_key_pem(&self) -> Vec<u8> {
        self.private_key.private_key_to_pem_pkcs8().unwrap()
    }
}
