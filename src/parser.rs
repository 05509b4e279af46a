//! Scanner for the `<Patch>` block format.
//!
//! The text is walked once for block spans (`<Patch>` up to the next `</Patch>`), then each span
//! is searched for backtick-quoted assignments:
//!
//! ```text
//! <Patch>
//! patch_name = `SomeUniqueName`
//! #replace_something
//! patch_enable = `yes`
//! patch_group = `SomeGroup`
//! </Patch>
//! ```
//!
//! Blocks missing a name or a valid enable token are skipped rather than failing the file; each
//! skip is reported as a [`ParseWarning`] and logged.

use crate::patch::{PatchRecord, Status};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::path::Path;

const OPEN_MARKER: &str = "<Patch>";
const CLOSE_MARKER: &str = "</Patch>";
const NAME_KEY: &str = "patch_name";
const ENABLE_KEY: &str = "patch_enable";
const GROUP_KEY: &str = "patch_group";
const REPLACE_PREFIX: &str = "replace_";

#[derive(Clone, Debug, Default)]
/// Everything the scanner found in one file.
pub struct ParsedFile {
    /// Well-formed blocks in the order their open markers appear.
    pub records: Vec<PatchRecord>,
    /// Blocks that were skipped or look suspicious.
    pub warnings: Vec<ParseWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A non-fatal problem with one block.
pub struct ParseWarning {
    /// 1-based line of the block's open marker.
    pub line: usize,
    /// What was wrong.
    pub kind: WarningKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Kinds of block-level problems the scanner reports.
pub enum WarningKind {
    /// An open marker with no close marker before the next open marker or end of text.
    UnclosedBlock,
    /// No `patch_name` assignment; the block was skipped.
    MissingName,
    /// No `patch_enable` assignment after the name; the block was skipped.
    MissingStatus {
        /// Name of the skipped block.
        name: String,
    },
    /// The enable token is neither `` `yes` `` nor `` `no` ``; the block was skipped.
    InvalidStatus {
        /// Name of the skipped block.
        name: String,
        /// Token as written in the file.
        token: String,
    },
    /// A key assigned more than once in one block; the first assignment was used.
    RepeatedAttribute {
        /// The repeated key.
        key: &'static str,
    },
    /// A name already used by an earlier block in the same file.
    DuplicateName {
        /// The shared name.
        name: String,
        /// Line of the earlier block.
        first_line: usize,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            WarningKind::UnclosedBlock => write!(f, "{OPEN_MARKER} without matching {CLOSE_MARKER}"),
            WarningKind::MissingName => write!(f, "block has no {NAME_KEY}, skipped"),
            WarningKind::MissingStatus { name } => {
                write!(f, "patch {name} has no {ENABLE_KEY}, skipped")
            }
            WarningKind::InvalidStatus { name, token } => {
                write!(f, "patch {name} has invalid {ENABLE_KEY} {token}, skipped")
            }
            WarningKind::RepeatedAttribute { key } => {
                write!(f, "{key} assigned more than once, using the first")
            }
            WarningKind::DuplicateName { name, first_line } => {
                write!(f, "patch {name} already defined at line {first_line}")
            }
        }
    }
}

/// A `key = `value`` occurrence, offsets absolute within the file text.
struct Assignment {
    key_at: usize,
    /// Value including its backticks.
    value: Range<usize>,
}

impl Assignment {
    fn inner(&self, text: &str) -> String {
        text[self.value.start + 1..self.value.end - 1].to_string()
    }
}

struct Block {
    line: usize,
    /// Text between the open and close markers.
    body: Range<usize>,
}

#[must_use]
/// Scan a file's text into patch records. The text is only borrowed; nothing is rewritten here.
pub fn parse(text: &str, source_file: &Path) -> ParsedFile {
    let (blocks, mut warnings) = find_blocks(text);
    let mut records = Vec::with_capacity(blocks.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let Some(record) = parse_block(text, &block, source_file, &mut warnings) else {
            continue;
        };
        if let Some(&first_line) = seen.get(&record.name) {
            warnings.push(ParseWarning {
                line: block.line,
                kind: WarningKind::DuplicateName {
                    name: record.name.clone(),
                    first_line,
                },
            });
        } else {
            seen.insert(record.name.clone(), block.line);
        }
        records.push(record);
    }

    warnings.sort_by_key(|w| w.line);
    for warning in &warnings {
        tracing::warn!(file = %source_file.display(), "{warning}");
    }
    tracing::debug!(
        file = %source_file.display(),
        records = records.len(),
        warnings = warnings.len(),
        "parsed patch file"
    );

    ParsedFile { records, warnings }
}

fn find_blocks(text: &str) -> (Vec<Block>, Vec<ParseWarning>) {
    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(OPEN_MARKER) {
        let open = cursor + rel;
        let body_start = open + OPEN_MARKER.len();
        let rest = &text[body_start..];
        let close = rest.find(CLOSE_MARKER).map(|r| body_start + r);
        let next_open = rest.find(OPEN_MARKER).map(|r| body_start + r);
        let line = line_at(text, open);

        match (close, next_open) {
            (Some(close), next) if next.is_none_or(|next| close < next) => {
                blocks.push(Block {
                    line,
                    body: body_start..close,
                });
                cursor = close + CLOSE_MARKER.len();
            }
            (_, Some(next)) => {
                warnings.push(ParseWarning {
                    line,
                    kind: WarningKind::UnclosedBlock,
                });
                cursor = next;
            }
            (None, None) => {
                warnings.push(ParseWarning {
                    line,
                    kind: WarningKind::UnclosedBlock,
                });
                break;
            }
            (Some(_), None) => unreachable!("covered by the first arm's guard"),
        }
    }

    (blocks, warnings)
}

fn parse_block(
    text: &str,
    block: &Block,
    source_file: &Path,
    warnings: &mut Vec<ParseWarning>,
) -> Option<PatchRecord> {
    let mut warn = |kind| {
        warnings.push(ParseWarning {
            line: block.line,
            kind,
        });
    };

    let names = find_assignments(text, block.body.clone(), NAME_KEY);
    let Some(name_at) = names.first() else {
        warn(WarningKind::MissingName);
        return None;
    };
    if names.len() > 1 {
        warn(WarningKind::RepeatedAttribute { key: NAME_KEY });
    }
    let name = name_at.inner(text);

    let enables = find_assignments(text, block.body.clone(), ENABLE_KEY);
    if enables.len() > 1 {
        warn(WarningKind::RepeatedAttribute { key: ENABLE_KEY });
    }
    let Some(enable) = enables.iter().find(|a| a.key_at > name_at.value.end) else {
        warn(WarningKind::MissingStatus { name });
        return None;
    };
    let token = &text[enable.value.clone()];
    let Some(status) = Status::from_token(token) else {
        warn(WarningKind::InvalidStatus {
            name,
            token: token.to_string(),
        });
        return None;
    };

    let group = find_assignments(text, block.body.clone(), GROUP_KEY)
        .first()
        .map(|a| a.inner(text));

    let line_start = text[..name_at.key_at].rfind('\n').map_or(0, |nl| nl + 1);

    Some(PatchRecord {
        name,
        status,
        group,
        source_file: source_file.to_path_buf(),
        help_text: text[name_at.key_at..block.body.end].to_string(),
        replacement_candidates: replacement_candidates(&text[line_start..block.body.end]),
        status_span: enable.value.clone(),
        line: block.line,
    })
}

/// All `key = `value`` assignments inside `span`, in order.
///
/// The key must not be the tail of a longer identifier, and the value may not contain a
/// backtick or a newline or be empty.
fn find_assignments(text: &str, span: Range<usize>, key: &str) -> Vec<Assignment> {
    let body = &text[span.clone()];
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(rel) = body[from..].find(key) {
        let key_at = from + rel;
        from = key_at + key.len();

        let preceded_by_ident = body[..key_at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if preceded_by_ident {
            continue;
        }
        if let Some(value) = literal_after_equals(body, from) {
            found.push(Assignment {
                key_at: span.start + key_at,
                value: span.start + value.start..span.start + value.end,
            });
        }
    }

    found
}

/// Match `\s*=\s*`value`` at `pos` (spaces and tabs only), returning the literal's range.
fn literal_after_equals(body: &str, pos: usize) -> Option<Range<usize>> {
    let is_blank = |c: char| c == ' ' || c == '\t';
    let after_key = &body[pos..];
    let eq = after_key.trim_start_matches(is_blank);
    let after_eq = eq.strip_prefix('=')?;
    let value = after_eq.trim_start_matches(is_blank);
    let inner = value.strip_prefix('`')?;
    let end = inner.find(['`', '\n'])?;
    if end == 0 || !inner[end..].starts_with('`') {
        return None;
    }
    let start = body.len() - value.len();
    Some(start..start + end + 2)
}

/// Lines that look like `replace_...` or `#replace_...`, without their line terminator.
fn replacement_candidates(region: &str) -> Vec<String> {
    region
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| {
            let line = line.strip_prefix('#').unwrap_or(line);
            line.strip_prefix(REPLACE_PREFIX)
                .is_some_and(|rest| !rest.is_empty())
        })
        .map(str::to_string)
        .collect()
}

fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
