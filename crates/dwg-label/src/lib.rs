//! Value types shared by the drawing text-label tooling.
//!
//! The central type is [`TextLabel`]: one normalized text annotation with
//! its insertion position. Everything downstream — diffing, offset
//! analysis, title-block heuristics — operates on flat lists of these and
//! never on raw document entities.

pub mod mtext;
pub mod quantize;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One text annotation extracted from a drawing.
///
/// `text` is already normalized (markup stripped, whitespace collapsed).
/// Duplicates are meaningful: the same text at the same position twice is
/// two independent annotations, not one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }

    /// Euclidean distance from this label's position to a point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Total order on `(text, x, y)`, used for the asc/desc sort options.
    pub fn cmp_text_then_position(&self, other: &Self) -> Ordering {
        self.text
            .cmp(&other.text)
            .then(self.x.total_cmp(&other.x))
            .then(self.y.total_cmp(&other.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let label = TextLabel::new("R1", 3.0, 0.0);
        assert_eq!(label.distance_to(0.0, 4.0), 5.0);
    }

    #[test]
    fn test_text_position_order() {
        let mut labels = vec![
            TextLabel::new("R2", 0.0, 0.0),
            TextLabel::new("R1", 5.0, 1.0),
            TextLabel::new("R1", 5.0, 0.0),
            TextLabel::new("R1", 2.0, 9.0),
        ];
        labels.sort_by(|a, b| a.cmp_text_then_position(b));

        let order: Vec<(&str, f64, f64)> =
            labels.iter().map(|l| (l.text.as_str(), l.x, l.y)).collect();
        assert_eq!(
            order,
            vec![
                ("R1", 2.0, 9.0),
                ("R1", 5.0, 0.0),
                ("R1", 5.0, 1.0),
                ("R2", 0.0, 0.0),
            ]
        );
    }
}
