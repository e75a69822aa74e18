//! Dashboard rendering and report export.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders a [`crate::models::Report`] (or a no-data message)
//!   as the Markdown dashboard printed to the terminal
//! - [`json`]: Writes the report as JSON and the rendered Markdown to the
//!   optional output directories

pub mod json;
pub mod markdown;
