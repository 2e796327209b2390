//! Domain layer: pure data-format logic with no I/O.

pub mod codepage;
pub mod compression;
pub mod constants;
pub mod dir;
pub mod module_stream;
pub mod normalize;
pub mod project;
pub mod project_stream;
pub mod sigfile;
pub mod spc;
