//! Bucketed multiset reconciliation of two label sets.

use std::collections::BTreeMap;

use serde::Serialize;

use dwg_label::TextLabel;
use dwg_label::quantize::GridPoint;

/// One classified difference at a bucket.
///
/// Exactly one of `old_label`/`new_label` is `None` for a pure
/// removal/addition; both are set for a best-effort rename pairing
/// within the bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub x: f64,
    pub y: f64,
    pub old_label: Option<String>,
    pub new_label: Option<String>,
}

/// Copies of a label present, unmodified, in both versions at a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnchangedEntry {
    pub label: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelDiff {
    pub changes: Vec<ChangeRecord>,
    pub unchanged: Vec<UnchangedEntry>,
}

impl LabelDiff {
    /// Label units of the old set this diff accounts for.
    pub fn old_units(&self) -> usize {
        self.unchanged.iter().map(|u| u.count).sum::<usize>()
            + self
                .changes
                .iter()
                .filter(|c| c.old_label.is_some())
                .count()
    }

    /// Label units of the new set this diff accounts for.
    pub fn new_units(&self) -> usize {
        self.unchanged.iter().map(|u| u.count).sum::<usize>()
            + self
                .changes
                .iter()
                .filter(|c| c.new_label.is_some())
                .count()
    }
}

/// Shift every label by `(dx, dy)`.
///
/// Batch drivers use this to pre-translate one side with a precomputed
/// offset before diffing, cancelling a known re-basing of the origin.
pub fn translate(labels: &mut [TextLabel], dx: f64, dy: f64) {
    for label in labels {
        label.x += dx;
        label.y += dy;
    }
}

/// Group a label set into per-bucket text multisets.
fn bucketize(labels: &[TextLabel], tolerance: f64) -> BTreeMap<GridPoint, BTreeMap<&str, usize>> {
    let mut buckets: BTreeMap<GridPoint, BTreeMap<&str, usize>> = BTreeMap::new();
    for label in labels {
        let point = GridPoint::new(label.x, label.y, tolerance);
        *buckets
            .entry(point)
            .or_default()
            .entry(label.text.as_str())
            .or_insert(0) += 1;
    }
    buckets
}

/// Diff two label sets at the given coordinate tolerance.
///
/// Every label unit in either input is accounted for exactly once:
/// either inside an [`UnchangedEntry`] count or as exactly one
/// [`ChangeRecord`] endpoint.
pub fn diff_labels(old: &[TextLabel], new: &[TextLabel], tolerance: f64) -> LabelDiff {
    let mut old_buckets = bucketize(old, tolerance);
    let mut new_buckets = bucketize(new, tolerance);

    let keys: Vec<GridPoint> = old_buckets
        .keys()
        .chain(new_buckets.keys())
        .copied()
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut diff = LabelDiff::default();
    for point in keys {
        let mut old_counts = old_buckets.remove(&point).unwrap_or_default();
        let mut new_counts = new_buckets.remove(&point).unwrap_or_default();

        // Retire the overlap of the two multisets as unchanged.
        let shared: Vec<&str> = old_counts
            .keys()
            .filter(|text| new_counts.contains_key(**text))
            .copied()
            .collect();
        for text in shared {
            let old_count = old_counts.get(text).copied().unwrap_or(0);
            let new_count = new_counts.get(text).copied().unwrap_or(0);
            let matched = old_count.min(new_count);
            if matched > 0 {
                diff.unchanged.push(UnchangedEntry {
                    label: text.to_string(),
                    count: matched,
                    x: point.x,
                    y: point.y,
                });
                decrement(&mut old_counts, text, matched);
                decrement(&mut new_counts, text, matched);
            }
        }

        // Remaining units, flattened and text-sorted (BTreeMap order),
        // pair positionally; lexicographic order is the tie-break, not
        // semantic similarity.
        let old_only = flatten(&old_counts);
        let new_only = flatten(&new_counts);
        let pairable = old_only.len().min(new_only.len());

        for i in 0..pairable {
            diff.changes.push(ChangeRecord {
                x: point.x,
                y: point.y,
                old_label: Some(old_only[i].to_string()),
                new_label: Some(new_only[i].to_string()),
            });
        }
        for text in &old_only[pairable..] {
            diff.changes.push(ChangeRecord {
                x: point.x,
                y: point.y,
                old_label: Some(text.to_string()),
                new_label: None,
            });
        }
        for text in &new_only[pairable..] {
            diff.changes.push(ChangeRecord {
                x: point.x,
                y: point.y,
                old_label: None,
                new_label: Some(text.to_string()),
            });
        }
    }

    diff.changes.sort_by(|a, b| {
        let key = |c: &ChangeRecord| {
            (
                c.old_label.clone().unwrap_or_default(),
                c.new_label.clone().unwrap_or_default(),
            )
        };
        key(a).cmp(&key(b))
    });
    diff
}

fn decrement(counts: &mut BTreeMap<&str, usize>, text: &str, by: usize) {
    if let Some(count) = counts.get_mut(text) {
        *count -= by;
        if *count == 0 {
            counts.remove(text);
        }
    }
}

/// Expand a count map to a flat sorted list of text references.
fn flatten<'a>(counts: &BTreeMap<&'a str, usize>) -> Vec<&'a str> {
    let mut flat = Vec::new();
    for (text, count) in counts {
        flat.extend(std::iter::repeat_n(*text, *count));
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str, x: f64, y: f64) -> TextLabel {
        TextLabel::new(text, x, y)
    }

    #[test]
    fn test_pure_removal() {
        let old = vec![label("R1", 0.0, 0.0)];
        let diff = diff_labels(&old, &[], 0.01);
        assert!(diff.unchanged.is_empty());
        assert_eq!(
            diff.changes,
            vec![ChangeRecord {
                x: 0.0,
                y: 0.0,
                old_label: Some("R1".to_string()),
                new_label: None,
            }]
        );
    }

    #[test]
    fn test_duplicate_counts_partially_retire() {
        let old = vec![label("R1", 0.0, 0.0), label("R1", 0.0, 0.0)];
        let new = vec![label("R1", 0.0, 0.0)];
        let diff = diff_labels(&old, &new, 0.01);
        assert_eq!(
            diff.unchanged,
            vec![UnchangedEntry {
                label: "R1".to_string(),
                count: 1,
                x: 0.0,
                y: 0.0,
            }]
        );
        assert_eq!(
            diff.changes,
            vec![ChangeRecord {
                x: 0.0,
                y: 0.0,
                old_label: Some("R1".to_string()),
                new_label: None,
            }]
        );
    }

    #[test]
    fn test_rename_pairing_within_bucket() {
        let old = vec![label("R1", 0.0, 0.0), label("R2", 0.0, 0.0)];
        let new = vec![label("R3", 0.0, 0.0)];
        let diff = diff_labels(&old, &new, 0.01);
        // Lexicographically first old label pairs with the new one.
        assert_eq!(
            diff.changes,
            vec![
                ChangeRecord {
                    x: 0.0,
                    y: 0.0,
                    old_label: Some("R1".to_string()),
                    new_label: Some("R3".to_string()),
                },
                ChangeRecord {
                    x: 0.0,
                    y: 0.0,
                    old_label: Some("R2".to_string()),
                    new_label: None,
                },
            ]
        );
    }

    #[test]
    fn test_nearby_positions_share_bucket() {
        let old = vec![label("R1", 10.003, -4.998)];
        let new = vec![label("R1", 9.999, -5.001)];
        let diff = diff_labels(&old, &new, 0.01);
        assert!(diff.changes.is_empty());
        assert_eq!(diff.unchanged.len(), 1);
        assert_eq!(diff.unchanged[0].count, 1);
        assert_eq!((diff.unchanged[0].x, diff.unchanged[0].y), (10.0, -5.0));
    }

    #[test]
    fn test_distant_positions_do_not_match() {
        let old = vec![label("R1", 0.0, 0.0)];
        let new = vec![label("R1", 5.0, 0.0)];
        let diff = diff_labels(&old, &new, 0.01);
        assert!(diff.unchanged.is_empty());
        assert_eq!(diff.changes.len(), 2);
        // Sorted by (old, new): the addition ("", "R1") sorts before
        // the removal ("R1", "").
        assert_eq!(diff.changes[0].old_label, None);
        assert_eq!(diff.changes[0].new_label.as_deref(), Some("R1"));
        assert_eq!(diff.changes[1].old_label.as_deref(), Some("R1"));
        assert_eq!(diff.changes[1].new_label, None);
    }

    #[test]
    fn test_unit_conservation() {
        let old = vec![
            label("R1", 0.0, 0.0),
            label("R1", 0.0, 0.0),
            label("R2", 0.0, 0.0),
            label("C5", 3.0, 3.0),
            label("U9", 7.0, 7.0),
        ];
        let new = vec![
            label("R1", 0.0, 0.0),
            label("R7", 0.0, 0.0),
            label("C5", 3.0, 3.0),
            label("C6", 3.0, 3.0),
            label("X1", 12.0, 12.0),
        ];
        let diff = diff_labels(&old, &new, 0.01);
        assert_eq!(diff.old_units(), old.len());
        assert_eq!(diff.new_units(), new.len());
    }

    #[test]
    fn test_empty_inputs_are_valid() {
        let diff = diff_labels(&[], &[], 0.01);
        assert!(diff.changes.is_empty());
        assert!(diff.unchanged.is_empty());
    }

    #[test]
    fn test_zero_tolerance_exact_match_only() {
        let old = vec![label("R1", 1.00001, 0.0)];
        let new = vec![label("R1", 1.00002, 0.0)];
        let diff = diff_labels(&old, &new, 0.0);
        assert!(diff.unchanged.is_empty());
        assert_eq!(diff.changes.len(), 2);
    }

    #[test]
    fn test_changes_sorted_by_label_pair() {
        let old = vec![label("B", 0.0, 0.0), label("A", 9.0, 9.0)];
        let new = vec![label("C", 5.0, 5.0)];
        let diff = diff_labels(&old, &new, 0.01);
        let keys: Vec<(String, String)> = diff
            .changes
            .iter()
            .map(|c| {
                (
                    c.old_label.clone().unwrap_or_default(),
                    c.new_label.clone().unwrap_or_default(),
                )
            })
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_translate() {
        let mut labels = vec![label("R1", 1.0, 2.0)];
        translate(&mut labels, -1.0, 3.0);
        assert_eq!((labels[0].x, labels[0].y), (0.0, 5.0));
    }
}
