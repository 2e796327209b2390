//! PKCS#7 `SignedData` construction for the VBA signatures.
//!
//! Builds the detached signature over a marshalled `SpcIndirectDataContent`:
//! digestAlgorithms, encapContentInfo carrying the Microsoft content type,
//! the certificate chain, and a single `SignerInfo` whose authenticated
//! attributes are signed with the end-entity RSA key.

use md5::{Digest as _, Md5};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use openssl::x509::X509;
use sha2::Sha256;
use time::OffsetDateTime;

use crate::domain::constants::{
    ASN1_CONTEXT_0_TAG, ASN1_INTEGER_TAG, ASN1_NULL, ASN1_OCTET_STRING_TAG, ASN1_OID_TAG,
    ASN1_SEQUENCE_TAG, ASN1_SET_TAG, ASN1_UTCTIME_TAG, OID_CONTENT_TYPE, OID_MD5,
    OID_MESSAGE_DIGEST, OID_MS_STATEMENT_TYPE, OID_PKCS7_SIGNED_DATA, OID_RSA_ENCRYPTION,
    OID_SHA256, OID_SIGNING_TIME,
};
use crate::domain::spc::{der_contents, encode_length, wrap};
use crate::infra::error::SigningResult;

/// Digest algorithm used by a signature version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerDigest {
    /// Legacy V1 signatures.
    Md5,
    /// Agile and V3 signatures.
    Sha256,
}

impl SignerDigest {
    fn oid(self) -> &'static [u8] {
        match self {
            SignerDigest::Md5 => OID_MD5,
            SignerDigest::Sha256 => OID_SHA256,
        }
    }

    fn message_digest(self) -> MessageDigest {
        match self {
            SignerDigest::Md5 => MessageDigest::md5(),
            SignerDigest::Sha256 => MessageDigest::sha256(),
        }
    }

    fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            SignerDigest::Md5 => Md5::digest(data).to_vec(),
            SignerDigest::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// Builder for one detached PKCS#7 `SignedData`.
pub struct Pkcs7Signer<'a> {
    certificate: &'a X509,
    private_key: &'a PKey<Private>,
    ca_certificates: &'a [X509],
    digest: SignerDigest,
}

impl<'a> Pkcs7Signer<'a> {
    pub fn new(
        certificate: &'a X509,
        private_key: &'a PKey<Private>,
        ca_certificates: &'a [X509],
        digest: SignerDigest,
    ) -> Self {
        Self {
            certificate,
            private_key,
            ca_certificates,
            digest,
        }
    }

    /// Produce the full `SignedData` content-info DER for the given
    /// `SpcIndirectDataContent` bytes under the given content-type OID.
    pub fn sign_detached(&self, content_type: &[u8], content: &[u8]) -> SigningResult<Vec<u8>> {
        let attributes = self.build_signed_attributes(content_type, content);
        let attrs_body: Vec<u8> = attributes.concat();
        // The signature covers the attributes re-tagged as an explicit SET.
        let set_der = wrap(ASN1_SET_TAG, &attrs_body);
        let a0_der = wrap(ASN1_CONTEXT_0_TAG, &attrs_body);

        let mut signer = Signer::new(self.digest.message_digest(), self.private_key)?;
        signer.update(&set_der)?;
        let signature = signer.sign_to_vec()?;
        log::debug!(
            "signed {} attribute bytes, {} byte signature",
            set_der.len(),
            signature.len()
        );

        let signer_info = self.build_signer_info(&a0_der, &signature)?;

        let mut signed_data = Vec::new();
        // version INTEGER (1 for PKCS#7 v1.5)
        signed_data.extend_from_slice(&[0x02, 0x01, 0x01]);
        signed_data.extend_from_slice(&self.build_digest_algorithms());
        signed_data.extend_from_slice(&build_content_info(content_type, content));
        signed_data.extend_from_slice(&self.build_certificates()?);
        signed_data.extend_from_slice(&wrap(ASN1_SET_TAG, &signer_info));
        let signed_data_seq = wrap(ASN1_SEQUENCE_TAG, &signed_data);

        // Outer ContentInfo: signedData OID + [0] EXPLICIT SignedData.
        let mut body = wrap(ASN1_OID_TAG, OID_PKCS7_SIGNED_DATA);
        body.extend_from_slice(&wrap(ASN1_CONTEXT_0_TAG, &signed_data_seq));
        Ok(wrap(ASN1_SEQUENCE_TAG, &body))
    }

    /// The four authenticated attributes, each as a complete DER SEQUENCE,
    /// sorted by encoding as DER SET OF requires.
    fn build_signed_attributes(&self, content_type: &[u8], content: &[u8]) -> Vec<Vec<u8>> {
        // messageDigest covers the contents octets of the SPC structure,
        // not its outer SEQUENCE header.
        let digest = self
            .digest
            .hash(der_contents(content).unwrap_or(content));

        let mut attributes = vec![
            build_attribute(OID_CONTENT_TYPE, &wrap(ASN1_OID_TAG, content_type)),
            build_attribute(OID_SIGNING_TIME, &encode_utc_time(OffsetDateTime::now_utc())),
            build_attribute(
                OID_MESSAGE_DIGEST,
                &wrap(ASN1_OCTET_STRING_TAG, &digest),
            ),
            build_attribute(OID_MS_STATEMENT_TYPE, ASN1_NULL),
        ];
        attributes.sort();
        attributes
    }

    /// digestAlgorithms SET with a single AlgorithmIdentifier.
    fn build_digest_algorithms(&self) -> Vec<u8> {
        let mut algorithm = wrap(ASN1_OID_TAG, self.digest.oid());
        algorithm.extend_from_slice(ASN1_NULL);
        wrap(ASN1_SET_TAG, &wrap(ASN1_SEQUENCE_TAG, &algorithm))
    }

    /// certificates [0] IMPLICIT: end-entity certificate first, then the
    /// issuing chain.
    fn build_certificates(&self) -> SigningResult<Vec<u8>> {
        let mut certs = self.certificate.to_der()?;
        for ca in self.ca_certificates {
            certs.extend_from_slice(&ca.to_der()?);
        }
        Ok(wrap(ASN1_CONTEXT_0_TAG, &certs))
    }

    fn build_signer_info(&self, a0_der: &[u8], signature: &[u8]) -> SigningResult<Vec<u8>> {
        let mut info = Vec::new();
        // version INTEGER (1)
        info.extend_from_slice(&[0x02, 0x01, 0x01]);
        info.extend_from_slice(&self.build_issuer_and_serial()?);

        let mut digest_algorithm = wrap(ASN1_OID_TAG, self.digest.oid());
        digest_algorithm.extend_from_slice(ASN1_NULL);
        info.extend_from_slice(&wrap(ASN1_SEQUENCE_TAG, &digest_algorithm));

        info.extend_from_slice(a0_der);

        let mut signature_algorithm = wrap(ASN1_OID_TAG, OID_RSA_ENCRYPTION);
        signature_algorithm.extend_from_slice(ASN1_NULL);
        info.extend_from_slice(&wrap(ASN1_SEQUENCE_TAG, &signature_algorithm));

        info.extend_from_slice(&wrap(ASN1_OCTET_STRING_TAG, signature));
        Ok(wrap(ASN1_SEQUENCE_TAG, &info))
    }

    fn build_issuer_and_serial(&self) -> SigningResult<Vec<u8>> {
        let issuer = self.certificate.issuer_name().to_der()?;

        let serial = self.certificate.serial_number().to_bn()?;
        let mut serial_bytes = serial.to_vec();
        if serial_bytes.is_empty() {
            serial_bytes.push(0);
        }
        if serial_bytes[0] & 0x80 != 0 {
            serial_bytes.insert(0, 0x00);
        }

        let mut body = issuer;
        body.push(ASN1_INTEGER_TAG);
        body.extend_from_slice(&encode_length(serial_bytes.len()));
        body.extend_from_slice(&serial_bytes);
        Ok(wrap(ASN1_SEQUENCE_TAG, &body))
    }
}

/// `Attribute ::= SEQUENCE { type OID, values SET }`.
fn build_attribute(oid: &[u8], value: &[u8]) -> Vec<u8> {
    let mut body = wrap(ASN1_OID_TAG, oid);
    body.extend_from_slice(&wrap(ASN1_SET_TAG, value));
    wrap(ASN1_SEQUENCE_TAG, &body)
}

/// encapContentInfo: content type OID plus the SPC content under [0] EXPLICIT.
fn build_content_info(content_type: &[u8], content: &[u8]) -> Vec<u8> {
    let mut body = wrap(ASN1_OID_TAG, content_type);
    body.extend_from_slice(&wrap(ASN1_CONTEXT_0_TAG, content));
    wrap(ASN1_SEQUENCE_TAG, &body)
}

/// UTCTime `YYMMDDHHMMSSZ`.
fn encode_utc_time(now: OffsetDateTime) -> Vec<u8> {
    let text = format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        now.year() % 100,
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    );
    wrap(ASN1_UTCTIME_TAG, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::OID_SPC_INDIRECT_DATA_V2;

    #[test]
    fn attribute_encoding_is_sorted_sequence_set() {
        let attribute = build_attribute(OID_MESSAGE_DIGEST, &wrap(ASN1_OCTET_STRING_TAG, &[1]));
        assert_eq!(attribute[0], ASN1_SEQUENCE_TAG);
        assert_eq!(attribute[2], ASN1_OID_TAG);
        // The values SET follows the OID.
        let set_offset = 2 + 2 + OID_MESSAGE_DIGEST.len();
        assert_eq!(attribute[set_offset], ASN1_SET_TAG);
    }

    #[test]
    fn content_info_uses_explicit_zero_tag() {
        let content = wrap(ASN1_SEQUENCE_TAG, &[0x02, 0x01, 0x01]);
        let info = build_content_info(OID_SPC_INDIRECT_DATA_V2, &content);
        assert_eq!(info[0], ASN1_SEQUENCE_TAG);
        assert!(info.windows(content.len()).any(|w| w == content));
        assert!(info.iter().any(|&b| b == ASN1_CONTEXT_0_TAG));
    }

    #[test]
    fn utc_time_is_thirteen_characters() {
        let encoded = encode_utc_time(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap());
        assert_eq!(encoded[0], ASN1_UTCTIME_TAG);
        assert_eq!(encoded[1], 13);
        assert_eq!(encoded.last(), Some(&b'Z'));
    }
}
