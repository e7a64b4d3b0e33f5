//! Path canonicalization and relative naming for request filenames

use crate::error::CetError;
use std::path::{Component, Path, PathBuf};

/// Canonicalize a path so the walker and the main file agree on spelling.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, CetError> {
    dunce::canonicalize(path).map_err(|e| {
        CetError::InvalidPath(format!(
            "Failed to canonicalize {}: {}",
            path.display(),
            e
        ))
    })
}

/// Express `target` relative to the directory `base`, `/`-separated.
///
/// Both paths are expected to be absolute. Segments of `base` not shared with
/// `target` become `..`, so files above the main file's directory still get a
/// name the compiler can resolve.
pub fn relative_path(base: &Path, target: &Path) -> String {
    let base: Vec<Component> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target: Vec<Component> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..base.len() {
        segments.push("..".to_string());
    }
    for component in &target[common..] {
        segments.push(component.as_os_str().to_string_lossy().to_string());
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}
