//! The session state bridging parsed patch files and whoever toggles them.
//!
//! A session owns the loaded file texts plus two record sets: the original set as parsed from
//! disk and the working set the user edits. The working set is an owned clone, so restoring
//! defaults is a fresh clone of the original and never shares records with it. After a
//! successful apply the written texts are re-parsed and become the new original.

use crate::apply::{self, ApplyReport};
use crate::error::{ApplyError, ReadError};
use crate::input;
use crate::parser::{self, ParseWarning};
use crate::patch::{PatchRecord, RecordSet, Status};
use crate::plan::{Change, ChangePlan, PlanMiss};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
/// Loaded patch files with their original and edited records.
pub struct Session {
    texts: BTreeMap<PathBuf, String>,
    original: RecordSet,
    working: RecordSet,
    /// Parse warnings per file, from the most recent parse of that file.
    pub warnings: BTreeMap<PathBuf, Vec<ParseWarning>>,
    /// Files that could not be read when the session was loaded.
    pub read_errors: Vec<ReadError>,
}

impl Session {
    #[must_use]
    /// Read and parse every path; unreadable files are recorded and skipped.
    pub fn load(paths: &[PathBuf]) -> Self {
        let (texts, read_errors) = input::read_patch_files(paths);
        let mut session = Self::from_texts(texts);
        session.read_errors = read_errors;
        session
    }

    #[must_use]
    /// Build a session from already loaded file texts.
    pub fn from_texts(texts: BTreeMap<PathBuf, String>) -> Self {
        let mut session = Self {
            texts,
            ..Self::default()
        };
        session.reparse();
        session
    }

    fn reparse(&mut self) {
        self.original.clear();
        self.warnings.clear();
        for (path, text) in &self.texts {
            let parsed = parser::parse(text, path);
            self.original.insert(path.clone(), parsed.records);
            if !parsed.warnings.is_empty() {
                self.warnings.insert(path.clone(), parsed.warnings);
            }
        }
        self.working = self.original.clone();
    }

    #[must_use]
    /// Records as the user has edited them.
    pub const fn records(&self) -> &RecordSet {
        &self.working
    }

    #[must_use]
    /// Records as they were parsed from disk.
    pub const fn original(&self) -> &RecordSet {
        &self.original
    }

    #[must_use]
    /// Loaded text of every readable file.
    pub const fn texts(&self) -> &BTreeMap<PathBuf, String> {
        &self.texts
    }

    #[must_use]
    /// Total number of records across all files.
    pub fn len(&self) -> usize {
        self.working.values().map(Vec::len).sum()
    }

    #[must_use]
    /// Whether no file yielded any record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    /// The `index`-th record of `file` in the working set.
    pub fn record(&self, file: &Path, index: usize) -> Option<&PatchRecord> {
        self.working.get(file)?.get(index)
    }

    /// Set one record's status; returns false if there is no such record.
    pub fn set_status(&mut self, file: &Path, index: usize, status: Status) -> bool {
        match self.working.get_mut(file).and_then(|r| r.get_mut(index)) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Flip one record's status, returning the new status.
    pub fn toggle(&mut self, file: &Path, index: usize) -> Option<Status> {
        let record = self.working.get_mut(file)?.get_mut(index)?;
        record.status = record.status.toggled();
        Some(record.status)
    }

    /// Set the status of every record called `name` in any file; returns how many matched.
    pub fn set_by_name(&mut self, name: &str, status: Status) -> usize {
        let mut matched = 0;
        for record in self.working.values_mut().flatten() {
            if record.name == name {
                record.status = status;
                matched += 1;
            }
        }
        matched
    }

    /// Mark every record disabled.
    pub fn disable_all(&mut self) {
        for record in self.working.values_mut().flatten() {
            record.status = Status::Disabled;
        }
    }

    /// Discard all edits, going back to the statuses parsed from disk.
    pub fn restore_defaults(&mut self) {
        self.working = self.original.clone();
    }

    #[must_use]
    /// Whether any working status differs from the original.
    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }

    #[must_use]
    /// Pending toggles relative to the original records.
    pub fn change_plan(&self) -> ChangePlan {
        let mut changes = Vec::new();
        for (file, records) in &self.working {
            let Some(originals) = self.original.get(file) else {
                continue;
            };
            for (record, original) in records.iter().zip(originals) {
                if record.status != original.status {
                    changes.push(Change {
                        file: file.clone(),
                        name: record.name.clone(),
                        enable: record.status.is_enabled(),
                    });
                }
            }
        }
        ChangePlan { changes }
    }

    /// Apply a plan's statuses to the working set by file and name.
    ///
    /// Every record with a matching name in the named file is set. Entries that match nothing
    /// are returned rather than treated as errors.
    pub fn load_plan(&mut self, plan: ChangePlan) -> Vec<PlanMiss> {
        let mut misses = Vec::new();
        for change in plan.changes {
            let status = Status::from(change.enable);
            let mut matched = 0;
            if let Some(records) = self.working.get_mut(&change.file) {
                for record in records.iter_mut().filter(|r| r.name == change.name) {
                    record.status = status;
                    matched += 1;
                }
            }
            if matched == 0 {
                tracing::warn!(
                    file = %change.file.display(),
                    name = %change.name,
                    "plan entry matches no loaded patch"
                );
                misses.push(PlanMiss { change });
            }
        }
        misses
    }

    /// Validate and write the working statuses to disk.
    ///
    /// On success the written texts replace the loaded ones and the session is re-parsed, so the
    /// working set becomes the new original. If a write fails part way, the files that did land
    /// are folded in the same way while the other files keep their pending edits. Any other
    /// failure leaves the session unchanged.
    ///
    /// # Errors
    ///
    /// Propagates [`ApplyError`] from [`apply::apply_changes`].
    pub fn apply(&mut self) -> Result<ApplyReport, ApplyError> {
        match apply::apply_changes(&self.working, &self.texts) {
            Ok(report) => {
                self.absorb_written(&report.texts);
                Ok(report)
            }
            Err(ApplyError::Write {
                file,
                written,
                written_texts,
                source,
            }) => {
                self.absorb_written(&written_texts);
                Err(ApplyError::Write {
                    file,
                    written,
                    written_texts,
                    source,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Take on-disk texts for written files, keeping pending edits of every other file.
    fn absorb_written(&mut self, written: &BTreeMap<PathBuf, String>) {
        if written.is_empty() {
            return;
        }
        for (path, text) in written {
            self.texts.insert(path.clone(), text.clone());
        }
        let mut pending = std::mem::take(&mut self.working);
        self.reparse();
        for (path, records) in &mut self.working {
            if !written.contains_key(path) {
                if let Some(edited) = pending.remove(path) {
                    *records = edited;
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One line of the checkbox list: a file heading or a patch.
pub enum Row {
    /// Heading naming a file.
    File(PathBuf),
    /// The `index`-th record of `file`.
    Patch {
        /// Owning file.
        file: PathBuf,
        /// Position within the file's records.
        index: usize,
    },
}

/// Interactive state: a session plus the cursor and status line of the TUI.
pub struct AppState {
    /// Loaded files and records.
    pub session: Session,
    /// File headings and patches in display order.
    pub rows: Vec<Row>,
    /// Selected row; always a patch row when any exist.
    pub cursor: usize,
    /// Title and message of the most recent action, shown in the status bar.
    pub message: Option<(String, String)>,
}

impl AppState {
    #[must_use]
    /// Lay out rows for every file and place the cursor on the first patch.
    pub fn new(session: Session) -> Self {
        let mut app = Self {
            session,
            rows: Vec::new(),
            cursor: 0,
            message: None,
        };
        app.rebuild_rows();
        app.cursor = app.next_patch_row(0).unwrap_or(0);
        app
    }

    fn rebuild_rows(&mut self) {
        self.rows.clear();
        for (file, records) in self.session.records() {
            self.rows.push(Row::File(file.clone()));
            self.rows.extend((0..records.len()).map(|index| Row::Patch {
                file: file.clone(),
                index,
            }));
        }
    }

    fn next_patch_row(&self, from: usize) -> Option<usize> {
        (from..self.rows.len()).find(|&i| matches!(self.rows[i], Row::Patch { .. }))
    }

    fn prev_patch_row(&self, from: usize) -> Option<usize> {
        (0..=from.min(self.rows.len().saturating_sub(1)))
            .rev()
            .find(|&i| matches!(self.rows[i], Row::Patch { .. }))
    }

    #[must_use]
    /// The record under the cursor.
    pub fn current_record(&self) -> Option<&PatchRecord> {
        match self.rows.get(self.cursor)? {
            Row::Patch { file, index } => self.session.record(file, *index),
            Row::File(_) => None,
        }
    }

    /// Move the cursor to the next patch row, skipping file headings.
    pub fn move_down(&mut self) {
        if let Some(next) = self.next_patch_row(self.cursor + 1) {
            self.cursor = next;
        }
    }

    /// Move the cursor to the previous patch row, skipping file headings.
    pub fn move_up(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if let Some(prev) = self.prev_patch_row(self.cursor - 1) {
            self.cursor = prev;
        }
    }

    /// Flip the patch under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(Row::Patch { file, index }) = self.rows.get(self.cursor).cloned() {
            self.session.toggle(&file, index);
            self.message = None;
        }
    }

    /// Disable every patch in every file.
    pub fn disable_all(&mut self) {
        self.session.disable_all();
        self.message = Some(("Disabled".to_string(), "All patches disabled".to_string()));
    }

    /// Return every patch to its status on disk.
    pub fn restore_defaults(&mut self) {
        self.session.restore_defaults();
        self.message = Some(("Restored".to_string(), "Defaults restored".to_string()));
    }

    /// Write the working statuses and report the outcome in the status bar.
    pub fn apply(&mut self) {
        let result = self.session.apply();
        self.message = Some(match &result {
            Ok(report) if report.written.is_empty() => {
                ("Saved".to_string(), "Nothing to write".to_string())
            }
            Ok(report) => (
                "Saved".to_string(),
                format!("Wrote {} file(s)", report.written.len()),
            ),
            Err(e) => (e.title().to_string(), e.to_string()),
        });
        if result.is_ok() {
            self.rebuild_rows();
            if self.cursor >= self.rows.len() {
                self.cursor = self.prev_patch_row(self.rows.len()).unwrap_or(0);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
