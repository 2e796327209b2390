//! `SpcIndirectDataContent` construction for the three signature shapes.
//!
//! The structures are assembled as raw DER bytes. V1 carries a bare MD5
//! digest with the legacy content type; Agile and V3 share the newer content
//! type whose value is a `SigFormatDescriptorV1` and whose digest field is a
//! serialized `SigDataV1Serialized` blob wrapping the SHA-256 source hash.

use crate::domain::constants::{
    ASN1_CONTEXT_0_TAG, ASN1_NULL, ASN1_OCTET_STRING_TAG, ASN1_OID_TAG, ASN1_SEQUENCE_TAG,
    OID_MD5, OID_SHA256, OID_SPC_INDIRECT_DATA_V1, OID_SPC_INDIRECT_DATA_V2,
};

/// Null-terminated ASCII dotted form of the SHA-256 OID, as embedded in
/// `SigDataV1Serialized`.
const ALGORITHM_ID: &[u8] = b"2.16.840.1.101.3.4.2.1\0";

/// Encode a DER length field (short form below 128, long form above).
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 128 {
        vec![length as u8]
    } else if length < 256 {
        vec![0x81, length as u8]
    } else if length < 65536 {
        vec![0x82, (length >> 8) as u8, (length & 0xff) as u8]
    } else {
        vec![
            0x83,
            ((length >> 16) & 0xff) as u8,
            ((length >> 8) & 0xff) as u8,
            (length & 0xff) as u8,
        ]
    }
}

/// Wrap `content` in a tag-length-value triple.
pub fn wrap(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    out.extend_from_slice(&encode_length(content.len()));
    out.extend_from_slice(content);
    out
}

/// Return the contents octets of an outer DER value (tag and length
/// stripped), or `None` if the header is malformed.
pub fn der_contents(der: &[u8]) -> Option<&[u8]> {
    let (&first_len, rest) = der.get(1..)?.split_first()?;
    if first_len < 0x80 {
        return rest.get(..usize::from(first_len));
    }
    let count = usize::from(first_len & 0x7f);
    if count == 0 || count > 4 || rest.len() < count {
        return None;
    }
    let mut length = 0usize;
    for &byte in &rest[..count] {
        length = (length << 8) | usize::from(byte);
    }
    rest.get(count..count + length)
}

/// `SpcIndirectDataContent` for the legacy V1 signature: empty octet-string
/// value under the V1 content type, MD5 digest.
pub fn spc_indirect_data_v1(digest: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&wrap(ASN1_OID_TAG, OID_SPC_INDIRECT_DATA_V1));
    let empty_octets = wrap(ASN1_OCTET_STRING_TAG, &[]);
    data.extend_from_slice(&wrap(ASN1_CONTEXT_0_TAG, &empty_octets));
    let data_seq = wrap(ASN1_SEQUENCE_TAG, &data);

    let message_digest = digest_info(OID_MD5, digest);

    let mut content = data_seq;
    content.extend_from_slice(&message_digest);
    wrap(ASN1_SEQUENCE_TAG, &content)
}

/// `SpcIndirectDataContent` for the Agile and V3 signatures: the value is a
/// 12-byte `SigFormatDescriptorV1`, the digest a `SigDataV1Serialized` blob.
pub fn spc_indirect_data_v2(source_hash: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&wrap(ASN1_OID_TAG, OID_SPC_INDIRECT_DATA_V2));
    let descriptor = wrap(ASN1_OCTET_STRING_TAG, &sig_format_descriptor_v1());
    data.extend_from_slice(&wrap(ASN1_CONTEXT_0_TAG, &descriptor));
    let data_seq = wrap(ASN1_SEQUENCE_TAG, &data);

    let message_digest = digest_info(OID_SHA256, &sig_data_v1_serialized(source_hash));

    let mut content = data_seq;
    content.extend_from_slice(&message_digest);
    wrap(ASN1_SEQUENCE_TAG, &content)
}

/// `DigestInfo ::= SEQUENCE { AlgorithmIdentifier, OCTET STRING }` with
/// explicit NULL parameters.
fn digest_info(oid: &[u8], digest: &[u8]) -> Vec<u8> {
    let mut algorithm = wrap(ASN1_OID_TAG, oid);
    algorithm.extend_from_slice(ASN1_NULL);
    let algorithm_seq = wrap(ASN1_SEQUENCE_TAG, &algorithm);

    let mut content = algorithm_seq;
    content.extend_from_slice(&wrap(ASN1_OCTET_STRING_TAG, digest));
    wrap(ASN1_SEQUENCE_TAG, &content)
}

/// Little-endian `SigFormatDescriptorV1 { size = 12, version = 1, format = 1 }`.
fn sig_format_descriptor_v1() -> [u8; 12] {
    let mut out = [0u8; 12];
    out[0..4].copy_from_slice(&12u32.to_le_bytes());
    out[4..8].copy_from_slice(&1u32.to_le_bytes());
    out[8..12].copy_from_slice(&1u32.to_le_bytes());
    out
}

/// `SigDataV1Serialized`: six little-endian i32 header fields, the
/// null-terminated ASCII algorithm id, then the source hash. The compiled
/// hash is empty.
pub fn sig_data_v1_serialized(source_hash: &[u8]) -> Vec<u8> {
    let algorithm_id_size = ALGORITHM_ID.len() as i32;
    let header_size = 6 * 4;
    let mut out = Vec::with_capacity(header_size as usize + ALGORITHM_ID.len() + source_hash.len());
    for field in [
        algorithm_id_size,
        0, // compiledHashSize
        source_hash.len() as i32,
        header_size,                     // algorithmIdOffset
        header_size + algorithm_id_size, // compiledHashOffset
        header_size + algorithm_id_size, // sourceHashOffset
    ] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(ALGORITHM_ID);
    out.extend_from_slice(source_hash);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_structure_embeds_md5_digest() {
        let digest = [0xabu8; 16];
        let der = spc_indirect_data_v1(&digest);
        assert_eq!(der[0], ASN1_SEQUENCE_TAG);
        // Content type OID appears right inside the data sequence.
        assert_eq!(&der[4..6], &[ASN1_OID_TAG, OID_SPC_INDIRECT_DATA_V1.len() as u8]);
        assert!(der
            .windows(OID_SPC_INDIRECT_DATA_V1.len())
            .any(|w| w == OID_SPC_INDIRECT_DATA_V1));
        // Empty octet string value under the explicit [0] tag.
        assert!(der.windows(4).any(|w| w == [0xa0, 0x02, 0x04, 0x00]));
        assert!(der.windows(16).any(|w| w == digest));
    }

    #[test]
    fn sig_data_v1_layout() {
        let hash = [0x42u8; 32];
        let blob = sig_data_v1_serialized(&hash);
        assert_eq!(blob.len(), 24 + 23 + 32);
        assert_eq!(&blob[0..4], &23i32.to_le_bytes());
        assert_eq!(&blob[4..8], &0i32.to_le_bytes());
        assert_eq!(&blob[8..12], &32i32.to_le_bytes());
        assert_eq!(&blob[12..16], &24i32.to_le_bytes());
        assert_eq!(&blob[16..20], &47i32.to_le_bytes());
        assert_eq!(&blob[20..24], &47i32.to_le_bytes());
        assert_eq!(&blob[24..47], b"2.16.840.1.101.3.4.2.1\0");
        assert_eq!(&blob[47..], &hash);
    }

    #[test]
    fn v2_structure_carries_format_descriptor_and_blob() {
        let hash = [0x42u8; 32];
        let der = spc_indirect_data_v2(&hash);
        let descriptor = sig_format_descriptor_v1();
        assert!(der.windows(12).any(|w| w == descriptor));
        assert!(der
            .windows(OID_SPC_INDIRECT_DATA_V2.len())
            .any(|w| w == OID_SPC_INDIRECT_DATA_V2));
        let blob = sig_data_v1_serialized(&hash);
        assert!(der.windows(blob.len()).any(|w| w == blob.as_slice()));
    }

    #[test]
    fn der_contents_strips_short_and_long_form() {
        let short = wrap(ASN1_SEQUENCE_TAG, &[1, 2, 3]);
        assert_eq!(der_contents(&short).unwrap(), &[1, 2, 3]);

        let long_payload = vec![7u8; 300];
        let long = wrap(ASN1_SEQUENCE_TAG, &long_payload);
        assert_eq!(der_contents(&long).unwrap(), long_payload.as_slice());

        assert!(der_contents(&[0x30]).is_none());
    }
}
