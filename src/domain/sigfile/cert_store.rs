//! The `VBASigSerializedCertStore` blob wrapping the signing certificate.

use crate::infra::error::{SigningError, SigningResult};

/// `fileType` magic: 'CERT' little-endian.
const FILE_TYPE_CERT: u32 = 0x5452_4543;
/// Element id of the certificate entry.
const ID_CERTIFICATE: u32 = 0x0000_0020;
/// encodingType for ASN.1 DER.
const ENCODING_ASN1: u32 = 0x0000_0001;

/// A parsed certificate store: any property entries that preceded the
/// certificate (skipped but retained), and the DER certificate itself.
#[derive(Debug, Clone)]
pub struct SerializedCertStore {
    pub properties: Vec<PropertyEntry>,
    pub certificate: Vec<u8>,
}

/// One `SerializedPropertyEntry`; its value is ignored by consumers.
#[derive(Debug, Clone)]
pub struct PropertyEntry {
    pub id: u32,
    pub value: Vec<u8>,
}

/// Serialize a store holding just the signing certificate. No property
/// entries are written; readers skip them anyway.
pub fn serialize_cert_store(certificate_der: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(certificate_der.len() + 32);
    out.extend_from_slice(&0u32.to_le_bytes()); // version
    out.extend_from_slice(&FILE_TYPE_CERT.to_le_bytes());
    out.extend_from_slice(&ID_CERTIFICATE.to_le_bytes());
    out.extend_from_slice(&ENCODING_ASN1.to_le_bytes());
    out.extend_from_slice(&(certificate_der.len() as u32).to_le_bytes());
    out.extend_from_slice(certificate_der);
    out.extend_from_slice(&0u32.to_le_bytes()); // end marker id
    out.extend_from_slice(&0u64.to_le_bytes()); // end marker padding
    out
}

impl SerializedCertStore {
    /// Parse a store, skipping any property entries before the certificate.
    pub fn parse(data: &[u8]) -> SigningResult<Self> {
        let mut reader = StoreReader { data, pos: 0 };

        let _version = reader.read_u32("version")?;
        let file_type = reader.read_u32("fileType")?;
        if file_type != FILE_TYPE_CERT {
            return Err(SigningError::SignatureFile(format!(
                "invalid fileType {file_type:#010x}, expected 0x54524543"
            )));
        }

        let mut properties = Vec::new();
        let certificate = loop {
            let id = reader.read_u32("element id")?;
            let encoding = reader.read_u32("encodingType")?;
            if encoding != ENCODING_ASN1 {
                return Err(SigningError::SignatureFile(format!(
                    "invalid encodingType {encoding:#010x}"
                )));
            }
            let length = reader.read_u32("element length")?;
            let value = reader.read_bytes(length as usize, "element value")?;
            if id == ID_CERTIFICATE {
                break value;
            }
            if id == 0 || id > 0x0000_ffff {
                return Err(SigningError::SignatureFile(format!(
                    "invalid property id {id:#010x}"
                )));
            }
            properties.push(PropertyEntry { id, value });
        };

        let end_id = reader.read_u32("end marker id")?;
        let end_padding = reader.read_bytes(8, "end marker padding")?;
        if end_id != 0 || end_padding.iter().any(|&b| b != 0) {
            return Err(SigningError::SignatureFile(
                "invalid end marker".to_string(),
            ));
        }

        Ok(Self {
            properties,
            certificate,
        })
    }
}

struct StoreReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StoreReader<'a> {
    fn read_bytes(&mut self, len: usize, what: &str) -> SigningResult<Vec<u8>> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = self.data[self.pos..end].to_vec();
                self.pos = end;
                Ok(bytes)
            }
            None => Err(SigningError::SignatureFile(format!(
                "certificate store truncated while reading {what}"
            ))),
        }
    }

    fn read_u32(&mut self, what: &str) -> SigningResult<u32> {
        let bytes = self.read_bytes(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
