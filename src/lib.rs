//! patchtoggle: toggle `<Patch>` blocks in patch files and write the choices back in place.
//!
//! The core is three steps: [`parser::parse`] turns a file's text into [`patch::PatchRecord`]s,
//! the caller edits their statuses (usually through an [`app_state::Session`]), and
//! [`apply::apply_changes`] checks group exclusivity and substitutes only the enable tokens
//! before overwriting the files.

pub mod app_state;
pub mod apply;
pub mod config;
pub mod error;
pub mod input;
pub mod parser;
pub mod patch;
pub mod plan;
pub mod ui;
