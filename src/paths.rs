//! Output folder containment.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolves `folder` against `base` and requires the result to stay inside it.
///
/// Resolution is lexical: `.` and `..` are folded without touching the
/// filesystem, so the folder does not need to exist yet. Returns the
/// resolved absolute path.
pub fn validate_log_folder(folder: &str, base: &Path) -> Result<PathBuf> {
    let base = normalize(base);
    let resolved = normalize(&base.join(folder));

    // Component-wise, so `/base-other` is not inside `/base`.
    if !resolved.starts_with(&base) {
        return Err(Error::PathOutsideBase {
            folder: folder.to_string(),
            resolved,
            base,
        });
    }
    Ok(resolved)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
