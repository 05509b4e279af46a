//! Errors surfaced to whoever drives the core: the CLI, the TUI, or a script.
//!
//! Every variant renders a message meant to be shown verbatim, and apply errors also carry a
//! short title so a front-end can present them as a dialog-style heading plus body.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(
    "There was a problem reading the file:\n\n{}\n\n{source}\n\nCheck that you have permission to read the file.",
    .path.display()
)]
/// A selected file could not be opened or decoded as UTF-8.
pub struct ReadError {
    /// File that failed to load.
    pub path: PathBuf,
    /// Underlying I/O failure (invalid UTF-8 surfaces as `InvalidData`).
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
/// Reasons a batch of status changes was not (fully) committed to disk.
pub enum ApplyError {
    /// More than one record of a group is enabled in the same file.
    #[error(
        "The following options in group {group} cannot be enabled together:\n{}\n{} was not written.",
        list_names(.names),
        .file.display()
    )]
    GroupConflict {
        /// File whose records conflict; no file in the batch was written.
        file: PathBuf,
        /// The shared group tag.
        group: String,
        /// Names of the enabled records in that group, in file order.
        names: Vec<String>,
    },
    /// A record's status span no longer holds an enable token in the file text.
    #[error(
        "The contents of {} changed since it was loaded (patch {name} could not be located).\n\nReload the file and try again.",
        .file.display()
    )]
    StaleText {
        /// File whose text no longer lines up with its records.
        file: PathBuf,
        /// Record that could not be located.
        name: String,
    },
    /// Records were supplied for a file whose text was never loaded.
    #[error("No loaded text for {}; it was not written.", .file.display())]
    MissingText {
        /// File with records but no text.
        file: PathBuf,
    },
    /// Writing a file failed part way through the batch.
    #[error(
        "There was a problem writing to the following file:\n\n{}\n\n{source}\n\nCheck that the file isn't in use by another program, and that you have write permissions to the file and folder.{}",
        .file.display(),
        list_written(.written)
    )]
    Write {
        /// File that failed to write.
        file: PathBuf,
        /// Files already written earlier in the same batch (not rolled back).
        written: Vec<PathBuf>,
        /// New text of each file in `written`, as it now is on disk.
        written_texts: BTreeMap<PathBuf, String>,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl ApplyError {
    #[must_use]
    /// Short heading for the failure, suitable for a dialog title or status bar prefix.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::GroupConflict { .. } => "Mutually Exclusive Options Detected!",
            Self::StaleText { .. } | Self::MissingText { .. } | Self::Write { .. } => "File Error!",
        }
    }
}

fn list_names(names: &[String]) -> String {
    names.iter().map(|name| format!("    {name}\n")).collect()
}

fn list_written(written: &[PathBuf]) -> String {
    if written.is_empty() {
        return String::new();
    }
    let files: String = written
        .iter()
        .map(|path| format!("\n    {}", path.display()))
        .collect();
    format!("\n\nThese files were already written and have been kept:{files}")
}
