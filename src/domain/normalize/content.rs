//! V1 `ContentNormalizedData` (MS-OVBA 2.4.2.1).

use crate::domain::dir::ReferenceKind;
use crate::domain::normalize::lines::{split_lines_v1, starts_with_ignore_case};
use crate::domain::project::VbaProject;

/// Build the V1 content-normalized buffer: project name, constants, the
/// reference contributions, then every module's source with `Attribute`
/// lines dropped.
pub fn content_normalized_data(project: &VbaProject) -> Vec<u8> {
    let mut buffer = Vec::new();

    buffer.extend_from_slice(&project.dir.information.name);
    buffer.extend_from_slice(&project.dir.information.constants);

    for reference in &project.dir.references {
        match &reference.kind {
            ReferenceKind::Registered(_) => buffer.push(0x7b),
            ReferenceKind::Project(body) => {
                let mut temp = Vec::new();
                temp.extend_from_slice(&(body.libid_absolute.len() as u32).to_le_bytes());
                temp.extend_from_slice(&body.libid_absolute);
                temp.extend_from_slice(&(body.libid_relative.len() as u32).to_le_bytes());
                temp.extend_from_slice(&body.libid_relative);
                temp.extend_from_slice(&body.major_version.to_le_bytes());
                temp.extend_from_slice(&u32::from(body.minor_version).to_le_bytes());
                temp.push(0x00);
                // Only the prefix up to the first zero byte contributes.
                let end = temp.iter().position(|&b| b == 0x00).unwrap_or(temp.len());
                buffer.extend_from_slice(&temp[..end]);
            }
            ReferenceKind::Control(_) | ReferenceKind::Original(_) => {}
        }
    }

    for module in &project.modules {
        for line in split_lines_v1(&module.source) {
            if starts_with_ignore_case(&line, b"attribute") {
                continue;
            }
            buffer.extend_from_slice(&line);
        }
    }

    buffer
}
