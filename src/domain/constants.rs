//! Centralized constants for commonly repeated DER/OID bytes and tags.
//! Keep this intentionally small; only broadly reused literals should live here.

// === ASN.1 DER Constants ===

/// ASN.1 NULL value (tag + zero length)
pub const ASN1_NULL: &[u8] = &[0x05, 0x00];

/// ASN.1 SEQUENCE tag (constructed)
pub const ASN1_SEQUENCE_TAG: u8 = 0x30;

/// ASN.1 SET tag (constructed)
pub const ASN1_SET_TAG: u8 = 0x31;

/// ASN.1 INTEGER tag
pub const ASN1_INTEGER_TAG: u8 = 0x02;

/// ASN.1 OBJECT IDENTIFIER tag
pub const ASN1_OID_TAG: u8 = 0x06;

/// ASN.1 OCTET STRING tag
pub const ASN1_OCTET_STRING_TAG: u8 = 0x04;

/// ASN.1 UTCTime tag
pub const ASN1_UTCTIME_TAG: u8 = 0x17;

/// ASN.1 context-specific tag [0], constructed
pub const ASN1_CONTEXT_0_TAG: u8 = 0xa0;

// === Microsoft SPC OIDs ===

/// SPC_INDIRECT_DATA content type for legacy V1 signatures (1.3.6.1.4.1.311.2.1.29)
pub const OID_SPC_INDIRECT_DATA_V1: &[u8] =
    &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x01, 0x1d];

/// SPC_INDIRECT_DATA content type for Agile/V3 signatures (1.3.6.1.4.1.311.2.1.31)
pub const OID_SPC_INDIRECT_DATA_V2: &[u8] =
    &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x01, 0x1f];

/// Microsoft statement-type signed attribute (1.3.6.1.4.1.311.2.1.12)
pub const OID_MS_STATEMENT_TYPE: &[u8] =
    &[0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x01, 0x0c];

// === PKCS#7 / PKCS#9 OIDs ===

/// PKCS#7 signedData (1.2.840.113549.1.7.2)
pub const OID_PKCS7_SIGNED_DATA: &[u8] =
    &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];

/// PKCS#9 contentType attribute (1.2.840.113549.1.9.3)
pub const OID_CONTENT_TYPE: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x03];

/// PKCS#9 messageDigest attribute (1.2.840.113549.1.9.4)
pub const OID_MESSAGE_DIGEST: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x04];

/// PKCS#9 signingTime attribute (1.2.840.113549.1.9.5)
pub const OID_SIGNING_TIME: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x05];

/// rsaEncryption (1.2.840.113549.1.1.1)
pub const OID_RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

// === Digest algorithm OIDs ===

/// MD5 (1.2.840.113549.2.5)
pub const OID_MD5: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x05];

/// SHA-256 (2.16.840.1.101.3.4.2.1)
pub const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
