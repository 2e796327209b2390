//! VBA Project Signer Library
//!
//! Signs the VBA macro project embedded in macro-enabled Office documents
//! (`.docm`, `.xlsm`, `.pptm`): parses the OLE `vbaProject.bin` container,
//! reconstructs the normalized-data buffers for the V1, Agile, and V3
//! signature variants, wraps their hashes in PKCS#7 `SignedData`, and
//! repacks the document with the signature parts, content types, and
//! relationships.

pub mod domain;
pub mod infra;
pub mod services;

use std::fs;
use std::path::{Path, PathBuf};

pub use domain::project::VbaProject;
pub use infra::error::{SigningError, SigningResult};
pub use services::signing::{SignatureVersion, SigningIdentity};
pub use services::{package_paths, parse_vba_project, read_vba_project_bin, rewrite_package};

/// Which signature variants to produce.
#[derive(Debug, Clone, Copy)]
pub struct SignOptions {
    /// Produce `vbaProjectSignature.bin` (MD5-based, legacy).
    pub include_v1: bool,
    /// Produce `vbaProjectSignatureAgile.bin` (SHA-256, includes forms).
    pub include_agile: bool,
    /// Produce `vbaProjectSignatureV3.bin` (SHA-256, includes project
    /// properties).
    pub include_v3: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            include_v1: false,
            include_agile: false,
            include_v3: true,
        }
    }
}

impl SignOptions {
    /// The enabled versions in part-emission order.
    pub fn versions(&self) -> Vec<SignatureVersion> {
        let mut versions = Vec::new();
        if self.include_v1 {
            versions.push(SignatureVersion::V1);
        }
        if self.include_agile {
            versions.push(SignatureVersion::Agile);
        }
        if self.include_v3 {
            versions.push(SignatureVersion::V3);
        }
        versions
    }
}

/// Main signing function: sign the VBA project of an Office document and
/// write the result alongside the input as `<base>-signed.<ext>`.
///
/// Returns the path of the signed document.
pub fn sign_vba_project(
    office_path: &Path,
    cert_path: &Path,
    key_path: &Path,
    ca_path: Option<&Path>,
    options: &SignOptions,
) -> SigningResult<PathBuf> {
    log::info!("signing VBA project of {}", office_path.display());

    let identity = SigningIdentity::from_pem_files(cert_path, key_path, ca_path)?;
    let paths = services::package_paths(office_path)?;
    let package = fs::read(office_path)?;

    let vba_bin = services::read_vba_project_bin(&package, paths.vba_root)?;
    let project = services::parse_vba_project(&vba_bin)?;
    log::info!(
        "parsed project {:?} with {} modules",
        project.project.name,
        project.modules.len()
    );

    let mut parts = Vec::new();
    for version in options.versions() {
        let blob = services::signature_part(&project, &identity, version)?;
        parts.push((version, blob));
    }

    let output = services::rewrite_package(&package, paths.vba_root, &parts)?;

    let stem = office_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_path =
        office_path.with_file_name(format!("{stem}-signed.{}", paths.extension));
    // Assembled fully in memory first so no partial output is left behind.
    fs::write(&output_path, output)?;
    log::info!("wrote {}", output_path.display());
    Ok(output_path)
}
