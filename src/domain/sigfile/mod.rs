//! On-disk signature blob formats: `DigSigInfoSerialized` and the
//! `VBASigSerializedCertStore` it embeds.

pub mod cert_store;
pub mod digsig;

pub use cert_store::{serialize_cert_store, PropertyEntry, SerializedCertStore};
pub use digsig::DigSigInfoSerialized;
