//! Parser for the tagged-text export of a Tamil/English lexicon.
//!
//! Each export row holds one dictionary entry in an inline tag dialect.
//! [`parse_entry`] turns that text into an [`Entry`] with header fields,
//! ordered meanings, etymology fragments and cross-references. The other
//! modules read the CSV export, fan parsing out over threads, and write the
//! results as JSON, YAML, JSON Lines or normalized CSV tables.

pub mod entry;
pub mod error;
pub mod markup;
pub mod output;
pub mod parallel;
pub mod source;

pub use entry::{parse_entry, Entry, Meaning};
pub use error::{Error, Result};
pub use output::Format;
pub use source::{Columns, SourceRow};
