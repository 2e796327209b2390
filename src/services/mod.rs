//! Service layer: pipeline stages composed from the domain pieces.

pub mod package;
pub mod pkcs7;
pub mod project_reader;
pub mod signing;

pub use package::{package_paths, read_vba_project_bin, rewrite_package, PackagePaths};
pub use project_reader::parse_vba_project;
pub use signing::{signature_part, SignatureVersion, SigningIdentity};
