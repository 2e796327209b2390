//! Per-version signature assembly: normalized data, hash, SPC structure,
//! PKCS#7 signing, and the final `DigSigInfoSerialized` blob.

use std::fs;
use std::path::Path;

use md5::{Digest as _, Md5};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use sha2::Sha256;

use crate::domain::constants::{OID_SPC_INDIRECT_DATA_V1, OID_SPC_INDIRECT_DATA_V2};
use crate::domain::normalize::{
    content_normalized_data, content_normalized_data_v3, forms_normalized_data,
    project_normalized_data,
};
use crate::domain::project::VbaProject;
use crate::domain::sigfile::{serialize_cert_store, DigSigInfoSerialized};
use crate::domain::spc::{spc_indirect_data_v1, spc_indirect_data_v2};
use crate::infra::error::{SigningError, SigningResult};
use crate::services::pkcs7::{Pkcs7Signer, SignerDigest};

/// The three detached signature variants Office understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVersion {
    /// MD5-based legacy signature.
    V1,
    /// SHA-256 signature that additionally covers form storages.
    Agile,
    /// SHA-256 signature that additionally covers project properties and
    /// strictly normalizes the dir-record layout.
    V3,
}

impl SignatureVersion {
    /// Part name of the signature file inside the package.
    pub fn part_name(self) -> &'static str {
        match self {
            SignatureVersion::V1 => "vbaProjectSignature.bin",
            SignatureVersion::Agile => "vbaProjectSignatureAgile.bin",
            SignatureVersion::V3 => "vbaProjectSignatureV3.bin",
        }
    }
}

/// End-entity certificate, its private key, and the optional issuing chain.
pub struct SigningIdentity {
    pub certificate: X509,
    pub private_key: PKey<Private>,
    pub ca_certificates: Vec<X509>,
}

impl SigningIdentity {
    /// Load PEM key material from disk. The key may be PKCS#1 or PKCS#8.
    pub fn from_pem_files(
        cert_path: &Path,
        key_path: &Path,
        ca_path: Option<&Path>,
    ) -> SigningResult<Self> {
        let certificate = X509::from_pem(&fs::read(cert_path)?)
            .map_err(|e| SigningError::Certificate(format!("failed to parse certificate: {e}")))?;
        let private_key = PKey::private_key_from_pem(&fs::read(key_path)?)
            .map_err(|e| SigningError::Certificate(format!("failed to parse private key: {e}")))?;

        let public_key = certificate
            .public_key()
            .map_err(|e| SigningError::Certificate(format!("failed to read public key: {e}")))?;
        if !private_key.public_eq(&public_key) {
            return Err(SigningError::Certificate(
                "private key does not match certificate".to_string(),
            ));
        }

        let mut ca_certificates = Vec::new();
        if let Some(path) = ca_path {
            let ca = X509::from_pem(&fs::read(path)?).map_err(|e| {
                SigningError::Certificate(format!("failed to parse issuing certificate: {e}"))
            })?;
            ca_certificates.push(ca);
        }

        Ok(Self {
            certificate,
            private_key,
            ca_certificates,
        })
    }
}

/// Compute the detached PKCS#7 signature for one signature version.
pub fn project_signature(
    project: &VbaProject,
    identity: &SigningIdentity,
    version: SignatureVersion,
) -> SigningResult<Vec<u8>> {
    let (digest_kind, content_type, spc_content) = match version {
        SignatureVersion::V1 => {
            let buffer = content_normalized_data(project);
            let digest = Md5::digest(&buffer);
            (
                SignerDigest::Md5,
                OID_SPC_INDIRECT_DATA_V1,
                spc_indirect_data_v1(&digest),
            )
        }
        SignatureVersion::Agile => {
            let mut buffer = content_normalized_data(project);
            buffer.extend_from_slice(&forms_normalized_data(project));
            let digest = Sha256::digest(&buffer);
            (
                SignerDigest::Sha256,
                OID_SPC_INDIRECT_DATA_V2,
                spc_indirect_data_v2(&digest),
            )
        }
        SignatureVersion::V3 => {
            let mut buffer = content_normalized_data_v3(project)?;
            buffer.extend_from_slice(&project_normalized_data(project)?);
            let digest = Sha256::digest(&buffer);
            (
                SignerDigest::Sha256,
                OID_SPC_INDIRECT_DATA_V2,
                spc_indirect_data_v2(&digest),
            )
        }
    };

    let signer = Pkcs7Signer::new(
        &identity.certificate,
        &identity.private_key,
        &identity.ca_certificates,
        digest_kind,
    );
    let signature = signer.sign_detached(content_type, &spc_content)?;
    log::info!(
        "created {:?} signature: {} bytes",
        version,
        signature.len()
    );
    Ok(signature)
}

/// Produce the on-disk `DigSigInfoSerialized` blob for one version.
pub fn signature_part(
    project: &VbaProject,
    identity: &SigningIdentity,
    version: SignatureVersion,
) -> SigningResult<Vec<u8>> {
    let signature = project_signature(project, identity, version)?;
    let cert_store = serialize_cert_store(&identity.certificate.to_der()?);
    Ok(DigSigInfoSerialized::new(signature, cert_store).serialize())
}
