//! The on-disk `DigSigInfoSerialized` blob: header, PKCS#7 signature,
//! certificate store, and the two reserved null-terminated strings.
//!
//! The header occupies 36 bytes on disk while the stored `signatureOffset`
//! is 44; Office expects exactly this 8-byte discrepancy, so the parser
//! slices by sizes from offset 36 and ignores the stored offsets.

use crate::infra::error::{SigningError, SigningResult};

/// Offset value stored in the header's `signatureOffset` field.
const SIGNATURE_OFFSET: u32 = 44;
/// Actual on-disk header size.
const HEADER_SIZE: usize = 36;

/// A VBA digital signature blob.
#[derive(Debug, Clone)]
pub struct DigSigInfoSerialized {
    /// PKCS#7 `SignedData` bytes.
    pub signature: Vec<u8>,
    /// `VBASigSerializedCertStore` bytes.
    pub cert_store: Vec<u8>,
}

impl DigSigInfoSerialized {
    pub fn new(signature: Vec<u8>, cert_store: Vec<u8>) -> Self {
        Self {
            signature,
            cert_store,
        }
    }

    /// Serialize header and payloads into the stream layout Office expects.
    pub fn serialize(&self) -> Vec<u8> {
        let cb_signature = self.signature.len() as u32;
        let cb_cert_store = self.cert_store.len() as u32;
        let cert_store_offset = SIGNATURE_OFFSET + cb_signature;
        let project_name_offset = cert_store_offset + cb_cert_store;
        let timestamp_url_offset = project_name_offset + 2;

        let mut out = Vec::with_capacity(HEADER_SIZE + self.signature.len() + self.cert_store.len() + 4);
        out.extend_from_slice(&cb_signature.to_le_bytes());
        out.extend_from_slice(&SIGNATURE_OFFSET.to_le_bytes());
        out.extend_from_slice(&cb_cert_store.to_le_bytes());
        out.extend_from_slice(&cert_store_offset.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // cbProjectName
        out.extend_from_slice(&project_name_offset.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // fTimestamp
        out.extend_from_slice(&0u32.to_le_bytes()); // cbTimestampUrl
        out.extend_from_slice(&timestamp_url_offset.to_le_bytes());
        out.extend_from_slice(&self.signature);
        out.extend_from_slice(&self.cert_store);
        out.extend_from_slice(&[0, 0]); // rgchProjectName terminator
        out.extend_from_slice(&[0, 0]); // rgchTimestamp terminator
        out
    }

    /// Parse a blob produced by [`serialize`](Self::serialize) (or by
    /// Office). Variable-length fields are located by their sizes starting
    /// at offset 36; the stored offsets depend on the producing host and are
    /// not trusted.
    pub fn parse(data: &[u8]) -> SigningResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SigningError::SignatureFile(
                "signature blob shorter than header".to_string(),
            ));
        }
        let read_u32 =
            |at: usize| u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        let cb_signature = read_u32(0) as usize;
        let cb_cert_store = read_u32(8) as usize;
        let cb_project_name = read_u32(16);
        let f_timestamp = read_u32(24);
        let cb_timestamp_url = read_u32(28);

        if cb_project_name != 0 || f_timestamp != 0 || cb_timestamp_url != 0 {
            return Err(SigningError::SignatureFile(
                "reserved fields should be zero".to_string(),
            ));
        }

        let signature_end = HEADER_SIZE
            .checked_add(cb_signature)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                SigningError::SignatureFile("signature extends past blob".to_string())
            })?;
        let cert_store_end = signature_end
            .checked_add(cb_cert_store)
            .filter(|&end| end + 4 <= data.len())
            .ok_or_else(|| {
                SigningError::SignatureFile("certificate store extends past blob".to_string())
            })?;

        Ok(Self {
            signature: data[HEADER_SIZE..signature_end].to_vec(),
            cert_store: data[signature_end..cert_store_end].to_vec(),
        })
    }
}
