//! Structural tests for the PKCS#7 `SignedData` builder.

mod common;

use common::TestIdentity;
use md5::Md5;
use sha2::{Digest as _, Sha256};

use vba_signer::domain::constants::{OID_SPC_INDIRECT_DATA_V1, OID_SPC_INDIRECT_DATA_V2};
use vba_signer::domain::spc::{der_contents, spc_indirect_data_v1, spc_indirect_data_v2};
use vba_signer::services::pkcs7::{Pkcs7Signer, SignerDigest};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[test]
fn sha256_signature_embeds_content_and_certificate() {
    let identity = TestIdentity::generate();
    let content = spc_indirect_data_v2(&[0x42u8; 32]);
    let signer = Pkcs7Signer::new(
        &identity.certificate,
        &identity.private_key,
        &[],
        SignerDigest::Sha256,
    );
    let pkcs7 = signer
        .sign_detached(OID_SPC_INDIRECT_DATA_V2, &content)
        .unwrap();

    assert_eq!(pkcs7[0], 0x30);
    // signedData OID
    assert!(contains(
        &pkcs7,
        &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02]
    ));
    // The eContent and the certificate both appear verbatim.
    assert!(contains(&pkcs7, &content));
    assert!(contains(&pkcs7, &identity.certificate.to_der().unwrap()));

    // The messageDigest attribute covers the contents octets of the SPC
    // structure (outer SEQUENCE header stripped).
    let digest = Sha256::digest(der_contents(&content).unwrap());
    assert!(contains(&pkcs7, &digest));

    // Microsoft statement-type attribute with NULL value.
    let ms_attribute = [
        0x06u8, 0x0a, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x01, 0x0c, 0x31, 0x02,
        0x05, 0x00,
    ];
    assert!(contains(&pkcs7, &ms_attribute));

    // A 2048-bit RSA signature is 256 bytes.
    assert!(contains(&pkcs7, &[0x04, 0x82, 0x01, 0x00]));
}

#[test]
fn md5_signature_uses_md5_digest_algorithm() {
    let identity = TestIdentity::generate();
    let content = spc_indirect_data_v1(&[0x13u8; 16]);
    let signer = Pkcs7Signer::new(
        &identity.certificate,
        &identity.private_key,
        &[],
        SignerDigest::Md5,
    );
    let pkcs7 = signer
        .sign_detached(OID_SPC_INDIRECT_DATA_V1, &content)
        .unwrap();

    // MD5 OID with NULL parameters in digestAlgorithms.
    let md5_algorithm = [
        0x30u8, 0x0c, 0x06, 0x08, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x05, 0x05, 0x00,
    ];
    assert!(contains(&pkcs7, &md5_algorithm));

    let digest = Md5::digest(der_contents(&content).unwrap());
    assert!(contains(&pkcs7, &digest));
}

#[test]
fn chain_certificates_are_embedded_after_the_leaf() {
    let identity = TestIdentity::generate();
    let issuer = TestIdentity::generate();
    let cas = vec![issuer.certificate.clone()];
    let content = spc_indirect_data_v2(&[0x42u8; 32]);
    let signer = Pkcs7Signer::new(
        &identity.certificate,
        &identity.private_key,
        &cas,
        SignerDigest::Sha256,
    );
    let pkcs7 = signer
        .sign_detached(OID_SPC_INDIRECT_DATA_V2, &content)
        .unwrap();

    let leaf = identity.certificate.to_der().unwrap();
    let ca = issuer.certificate.to_der().unwrap();
    let leaf_at = pkcs7
        .windows(leaf.len())
        .position(|w| w == leaf.as_slice())
        .unwrap();
    let ca_at = pkcs7
        .windows(ca.len())
        .position(|w| w == ca.as_slice())
        .unwrap();
    assert!(leaf_at < ca_at);
}
