//! Turning command line paths into loaded patch file text.
//!
//! Directories are searched recursively for matching extensions; explicit file paths are taken
//! as given. Each file is read whole and independently, so one unreadable file does not stop the
//! others from loading.

use crate::error::ReadError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Expand files and directories into a sorted, de-duplicated list of patch files.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn find_patch_files(paths: Vec<PathBuf>, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_dir(&path, extensions, &mut found)?;
        } else {
            found.push(path);
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}

fn collect_dir(dir: &Path, extensions: &[String], found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, extensions, found)?;
        } else if has_extension(&path, extensions) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[must_use]
/// Read each file as UTF-8, collecting failures per file instead of stopping.
pub fn read_patch_files(paths: &[PathBuf]) -> (BTreeMap<PathBuf, String>, Vec<ReadError>) {
    let mut texts = BTreeMap::new();
    let mut errors = Vec::new();
    for path in paths {
        match fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(file = %path.display(), bytes = text.len(), "read patch file");
                texts.insert(path.clone(), text);
            }
            Err(source) => {
                tracing::warn!(file = %path.display(), error = %source, "failed to read patch file");
                errors.push(ReadError {
                    path: path.clone(),
                    source,
                });
            }
        }
    }
    (texts, errors)
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
