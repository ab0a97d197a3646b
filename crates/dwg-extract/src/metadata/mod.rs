//! Title-block metadata heuristics.
//!
//! Title blocks are not machine-tagged; only approximate spatial
//! conventions are known (TITLE/REVISION marker labels, drawing numbers
//! in the bottom-right corner). The resolvers here recover
//! human-oriented fields from those conventions and return `None` when
//! no qualifying candidate exists — ambiguity is an expected outcome,
//! never an error.

mod numbers;
mod title;

pub use numbers::resolve_number_roles;
pub use title::resolve_title_and_subtitle;

use serde::{Deserialize, Serialize};

use crate::ResolverConfig;
use dwg_label::TextLabel;

/// Derived, read-only summary of one label set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingMetadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub main_drawing_number: Option<String>,
    pub source_drawing_number: Option<String>,
}

/// A drawing-number match with the position of the label it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberCandidate {
    /// Upper-cased matched text.
    pub value: String,
    pub x: f64,
    pub y: f64,
}

/// Find drawing-number candidates inside one label's text.
///
/// Matches are case-insensitive and upper-cased on output; repeated
/// matches of the same value within a single label collapse to one
/// candidate.
pub fn candidates_in_label(label: &TextLabel, config: &ResolverConfig) -> Vec<NumberCandidate> {
    let mut found: Vec<NumberCandidate> = Vec::new();
    for m in config.drawing_number_pattern.find_iter(&label.text) {
        let value = m.as_str().to_uppercase();
        if !found.iter().any(|c| c.value == value) {
            found.push(NumberCandidate {
                value,
                x: label.x,
                y: label.y,
            });
        }
    }
    found
}

pub(crate) fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

pub(crate) use distance as euclidean_distance;
