//! Directory walker that gathers sibling sources for multi-file compiles

use crate::api::FileEntry;
use crate::error::CetError;
use crate::project::path::{canonicalize_path, relative_path};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Skip lists applied while walking the search directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectOptions {
    /// Directory names pruned together with their subtree
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
    /// File names never sent even when the extension matches
    #[serde(default = "default_skip_files")]
    pub skip_files: Vec<String>,
}

pub(crate) fn default_skip_dirs() -> Vec<String> {
    vec![
        ".zig-cache".to_string(),
        ".git".to_string(),
        ".idea".to_string(),
        "node_modules".to_string(),
        "target".to_string(),
        "zig-out".to_string(),
    ]
}

pub(crate) fn default_skip_files() -> Vec<String> {
    vec!["build.zig".to_string()]
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            skip_dirs: default_skip_dirs(),
            skip_files: default_skip_files(),
        }
    }
}

impl CollectOptions {
    pub fn skips_dir(&self, name: &OsStr) -> bool {
        self.skip_dirs.iter().any(|d| OsStr::new(d) == name)
    }

    pub fn skips_file(&self, name: &OsStr) -> bool {
        self.skip_files.iter().any(|f| OsStr::new(f) == name)
    }
}

/// Directory to search: the canonical `root` when given, else the main file's directory.
pub fn resolve_search_dir(main_file: &Path, root: Option<&Path>) -> Result<PathBuf, CetError> {
    match root {
        Some(root) => canonicalize_path(root),
        None => main_file
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CetError::InvalidPath(format!("{} has no parent", main_file.display()))),
    }
}

/// Gather every file under `search_dir` sharing the main file's extension.
///
/// `main_file` must be canonical. Filenames in the result are relative to
/// `relative_to`, in walk order (lexical by file name). The first walk or read
/// error aborts the whole collection.
pub fn collect_project_files(
    search_dir: &Path,
    main_file: &Path,
    relative_to: &Path,
    options: &CollectOptions,
) -> Result<Vec<FileEntry>, CetError> {
    let Some(ext) = main_file.extension() else {
        return Ok(Vec::new());
    };
    let search_dir = canonicalize_path(search_dir)?;

    let walker = WalkDir::new(&search_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && options.skips_dir(entry.file_name()))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry
            .map_err(|e| CetError::Collect(format!("Failed to walk directory: {}", e)))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path.extension() != Some(ext)
            || path == main_file
            || options.skips_file(entry.file_name())
        {
            continue;
        }

        let bytes = std::fs::read(path).map_err(|e| {
            CetError::Collect(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let filename = relative_path(relative_to, path);
        debug!(file = %filename, bytes = bytes.len(), "Collected project file");
        files.push(FileEntry {
            filename,
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(files)
}
