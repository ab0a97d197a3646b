//! Label extraction from drawing documents.
//!
//! The document format itself lives behind the [`DocumentSource`] trait —
//! an external CAD reader (or the bundled JSON adapter) supplies layouts,
//! entities and layer names. This crate walks those entities, normalizes
//! their text into [`dwg_label::TextLabel`] values and, optionally, runs
//! the title-block heuristics that recover a drawing's title, subtitle
//! and drawing numbers.
//!
//! Extraction never panics past the document boundary: a document that
//! fails to open yields an [`Extraction`] with empty labels and an error
//! message, so one bad file cannot abort a batch.

mod config;
mod extract;
pub mod json;
pub mod metadata;
mod source;

pub use config::{DRAWING_NUMBER_PATTERN, ResolverConfig};
pub use extract::{ExtractOptions, Extraction, ExtractionInfo, SortOrder, extract_labels};
pub use metadata::DrawingMetadata;
pub use source::{DocumentSource, Entity};

use thiserror::Error;

/// Errors raised while reading a document through a [`DocumentSource`].
///
/// These are caught at the extraction boundary and converted into a
/// per-file error message; they never propagate into diffing or offset
/// analysis.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read document: {0}")]
    DocumentRead(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}
