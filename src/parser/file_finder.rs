use crate::errors::{AppError, AppResult};
use crate::models::FileKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the files of one kind directly inside `dir`.
///
/// Only regular files at the top level are considered (no recursion); the
/// extension is matched case-insensitively. Results are sorted by file name so
/// row discovery order does not depend on the filesystem.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or cannot be read.
pub fn list_files(dir: &Path, kind: FileKind) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::IoError(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }

    let mut files = Vec::with_capacity(8);
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            if ext.eq_ignore_ascii_case(kind.extension()) {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}
