//! The change plan is the serialisable form of a session's pending toggles.
//!
//! A plan lists the patches whose enable flag should differ from what the files currently say.
//! It is printed as JSON when an interactive session ends with unapplied changes, and can be fed
//! back with `--load-plan` to apply the same choices without the TUI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
/// Serialisable collection of status changes for batch application.
pub struct ChangePlan {
    /// Individual toggles, in file then block order.
    pub changes: Vec<Change>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Desired enable state of one named patch in one file.
pub struct Change {
    /// File containing the patch.
    pub file: PathBuf,
    /// Patch name as written between the backticks.
    pub name: String,
    /// Whether the patch should be enabled.
    pub enable: bool,
}

impl ChangePlan {
    #[must_use]
    /// Whether the plan changes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A plan entry that matched no loaded patch.
pub struct PlanMiss {
    /// The entry that was not applied.
    pub change: Change,
}

#[cfg(test)]
#[path = "tests/plan.rs"]
mod tests;
