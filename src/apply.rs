//! Committing edited statuses back into patch files.
//!
//! Applying is all-or-nothing for validation: every file's groups are checked before anything is
//! written. Writing itself is per file with no rollback, so a failure part way through reports
//! which files already landed on disk.

use crate::error::ApplyError;
use crate::patch::{PatchRecord, RecordSet, Status};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Files touched by a successful apply.
pub struct ApplyReport {
    /// Files rewritten on disk.
    pub written: Vec<PathBuf>,
    /// Files whose statuses all matched the text, left untouched.
    pub unchanged: Vec<PathBuf>,
    /// New text of every written file.
    pub texts: BTreeMap<PathBuf, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Flat success flag plus optional title and message, for display without further inspection.
pub struct Outcome {
    /// Whether the batch was committed.
    pub success: bool,
    /// Heading of the failure, if any.
    pub title: Option<String>,
    /// Human-readable description of the failure, if any.
    pub message: Option<String>,
}

impl From<&Result<ApplyReport, ApplyError>> for Outcome {
    fn from(result: &Result<ApplyReport, ApplyError>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                title: None,
                message: None,
            },
            Err(e) => Self {
                success: false,
                title: Some(e.title().to_string()),
                message: Some(e.to_string()),
            },
        }
    }
}

/// Reject the batch if any file has two or more enabled records sharing a group.
///
/// Files are checked in path order and the first conflicting group wins.
///
/// # Errors
///
/// Returns [`ApplyError::GroupConflict`] naming the file, group and enabled records.
pub fn validate_groups(records: &RecordSet) -> Result<(), ApplyError> {
    for (file, patches) in records {
        let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
        for patch in patches.iter().filter(|p| p.status.is_enabled()) {
            let Some(group) = patch.group.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(g, _)| *g == group) {
                Some((_, names)) => names.push(patch.name.clone()),
                None => groups.push((group, vec![patch.name.clone()])),
            }
        }

        if let Some((group, names)) = groups.into_iter().find(|(_, names)| names.len() > 1) {
            return Err(ApplyError::GroupConflict {
                file: file.clone(),
                group: group.to_string(),
                names,
            });
        }
    }
    Ok(())
}

/// Substitute every record's enable token into `text` in one pass.
///
/// Only the token at each record's status span changes; when no status differs from the text
/// the result is byte-identical to the input.
///
/// # Errors
///
/// Returns [`ApplyError::StaleText`] if a span does not currently hold an enable token, which
/// means the text is not the one the records were parsed from.
pub fn rewrite(file: &Path, text: &str, records: &[PatchRecord]) -> Result<String, ApplyError> {
    let mut ordered: Vec<&PatchRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.status_span.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for record in ordered {
        let span = record.status_span.clone();
        let current = (span.start >= cursor)
            .then(|| text.get(span.clone()))
            .flatten()
            .and_then(Status::from_token);
        if current.is_none() {
            return Err(ApplyError::StaleText {
                file: file.to_path_buf(),
                name: record.name.clone(),
            });
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(record.status.token());
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);

    Ok(out)
}

/// Validate, rewrite and write every file in `records`.
///
/// All texts are rewritten in memory before the first write. Files whose rewritten text equals
/// the loaded text are not written; the rest are overwritten in place with no backup.
///
/// # Errors
///
/// Returns [`ApplyError::GroupConflict`], [`ApplyError::MissingText`] or
/// [`ApplyError::StaleText`] before writing anything, and [`ApplyError::Write`] when a write
/// fails, listing the files already written in this batch.
pub fn apply_changes(
    records: &RecordSet,
    texts: &BTreeMap<PathBuf, String>,
) -> Result<ApplyReport, ApplyError> {
    validate_groups(records)?;

    let mut rewritten = Vec::with_capacity(records.len());
    for (file, patches) in records {
        let Some(text) = texts.get(file) else {
            return Err(ApplyError::MissingText { file: file.clone() });
        };
        let new_text = rewrite(file, text, patches)?;
        rewritten.push((file, new_text != *text, new_text));
    }

    let mut report = ApplyReport::default();
    for (file, changed, new_text) in rewritten {
        if !changed {
            tracing::debug!(file = %file.display(), "no status changes, skipping write");
            report.unchanged.push(file.clone());
            continue;
        }

        if let Err(source) = fs::write(file, &new_text) {
            tracing::error!(file = %file.display(), error = %source, "failed to write patch file");
            return Err(ApplyError::Write {
                file: file.clone(),
                written: report.written,
                written_texts: report.texts,
                source,
            });
        }
        tracing::debug!(file = %file.display(), "wrote patch file");
        report.written.push(file.clone());
        report.texts.insert(file.clone(), new_text);
    }

    tracing::info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "applied patch changes"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "tests/apply.rs"]
mod tests;
