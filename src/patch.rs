//! Patch records parsed out of `<Patch>` blocks.
//!
//! A record remembers exactly where its enable token sits in the file text so the writer can
//! substitute that token and nothing else.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;

/// Records per source file, each file's records in block order.
pub type RecordSet = BTreeMap<PathBuf, Vec<PatchRecord>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The two-valued enable flag of a patch.
pub enum Status {
    /// Written as `` `yes` ``.
    Enabled,
    /// Written as `` `no` ``.
    Disabled,
}

impl Status {
    #[must_use]
    /// The backtick-quoted literal exactly as it appears in a patch file.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Enabled => "`yes`",
            Self::Disabled => "`no`",
        }
    }

    #[must_use]
    /// Parse a full backtick-quoted token; anything but the two exact literals is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "`yes`" => Some(Self::Enabled),
            "`no`" => Some(Self::Disabled),
            _ => None,
        }
    }

    #[must_use]
    /// The opposite state.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }

    #[must_use]
    /// Whether this is the enabled state.
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<bool> for Status {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One toggle-able patch block from a patch file.
pub struct PatchRecord {
    /// Identifier between the backticks of `patch_name`.
    pub name: String,
    /// Current enable state; the writer emits `status.token()`.
    pub status: Status,
    /// Mutual-exclusion group, `None` when absent or empty.
    pub group: Option<String>,
    /// File the block was read from.
    pub source_file: PathBuf,
    /// Block text from the `patch_name` assignment up to the close marker.
    pub help_text: String,
    /// `replace_*` lines (optionally commented out) found in the block, kept verbatim.
    ///
    /// Nothing consumes these yet; applying replacement values is not supported.
    pub replacement_candidates: Vec<String>,
    /// Byte range of the enable token in the source text.
    pub status_span: Range<usize>,
    /// 1-based line of the block's `<Patch>` marker.
    pub line: usize,
}

impl PatchRecord {
    #[must_use]
    /// Checkbox label: the name, with the group in parentheses when there is one.
    pub fn label(&self) -> String {
        match &self.group {
            Some(group) => format!("{} ({group})", self.name),
            None => self.name.clone(),
        }
    }
}

#[must_use]
/// Row and column of the `pos`-th checkbox in a grid `cols` wide.
pub const fn grid_position(pos: usize, cols: usize) -> (usize, usize) {
    let cols = if cols == 0 { 1 } else { cols };
    (pos / cols, pos % cols)
}

#[cfg(test)]
#[path = "tests/patch.rs"]
mod tests;
