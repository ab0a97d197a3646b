//! Title and subtitle recovery.
//!
//! Convention: the human-readable title sits just right of a literal
//! "TITLE" marker label, below the "REVISION" marker when one exists.
//! The subtitle is the row directly below the title row with an
//! overlapping horizontal span. Rows are reconstructed from individual
//! word labels by y-proximity grouping.

use dwg_label::TextLabel;

use super::NumberCandidate;
use crate::ResolverConfig;

/// Minimum x gap between the TITLE marker and a title word.
const TITLE_MIN_X_GAP: f64 = 10.0;
/// Near-duplicate candidates within this distance per axis collapse.
const DUPLICATE_COORD_TOLERANCE: f64 = 1.0;
/// Words within this y distance belong to one row.
const ROW_Y_TOLERANCE: f64 = 5.0;
/// Rows within this distance of the topmost row compete for the title.
const TOP_ROW_Y_THRESHOLD: f64 = 10.0;

/// Resolve `(title, subtitle)` from a label set.
///
/// Either field is `None` when the heuristics find no qualifying
/// candidate; that is a silent, expected outcome.
pub fn resolve_title_and_subtitle(
    labels: &[TextLabel],
    drawing_numbers: &[NumberCandidate],
    config: &ResolverConfig,
) -> (Option<String>, Option<String>) {
    if labels.is_empty() {
        return (None, None);
    }

    // Marker labels. Several markers can appear (one per sub-drawing);
    // the rightmost wins.
    let mut title_marker: Option<&TextLabel> = None;
    let mut revision_marker: Option<&TextLabel> = None;
    for label in labels {
        match label.text.trim().to_uppercase().as_str() {
            "TITLE" => {
                if title_marker.is_none_or(|m| label.x > m.x) {
                    title_marker = Some(label);
                }
            }
            "REVISION" => {
                if revision_marker.is_none_or(|m| label.x > m.x) {
                    revision_marker = Some(label);
                }
            }
            _ => {}
        }
    }
    let Some(title_marker) = title_marker else {
        log::debug!("no TITLE marker label found");
        return (None, None);
    };

    // Words right of the TITLE marker, below REVISION when present.
    let mut candidates: Vec<&TextLabel> = Vec::new();
    for label in labels {
        let upper = label.text.trim().to_uppercase();
        if upper == "TITLE" || upper == "REVISION" {
            continue;
        }
        if drawing_numbers.iter().any(|dn| dn.value == label.text) {
            continue;
        }
        let x_diff = label.x - title_marker.x;
        if x_diff <= TITLE_MIN_X_GAP || x_diff >= config.title_proximity_x {
            continue;
        }
        if let Some(revision) = revision_marker
            && label.y >= revision.y
        {
            continue;
        }
        candidates.push(label);
    }
    if candidates.is_empty() {
        return (None, None);
    }

    // Duplicate entities at near-identical positions are artifacts of the
    // source document; keep the first of each.
    let mut deduplicated: Vec<&TextLabel> = Vec::new();
    for label in candidates {
        let duplicate = deduplicated.iter().any(|kept| {
            kept.text == label.text
                && (label.x - kept.x).abs() <= DUPLICATE_COORD_TOLERANCE
                && (label.y - kept.y).abs() <= DUPLICATE_COORD_TOLERANCE
        });
        if !duplicate {
            deduplicated.push(label);
        }
    }

    let rows = group_into_rows(deduplicated);
    if rows.is_empty() {
        return (None, None);
    }

    // Among rows near the topmost one, the leftmost-starting row is the
    // title row.
    let row_info: Vec<(usize, f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let min_x = row
                .iter()
                .map(|l| l.x)
                .fold(f64::INFINITY, f64::min);
            let avg_y = row.iter().map(|l| l.y).sum::<f64>() / row.len() as f64;
            (i, min_x, avg_y)
        })
        .collect();
    let max_y = row_info
        .iter()
        .map(|&(_, _, avg_y)| avg_y)
        .fold(f64::NEG_INFINITY, f64::max);
    // First minimal row wins on ties.
    let mut title_row_idx = usize::MAX;
    let mut best_min_x = f64::INFINITY;
    for &(i, min_x, avg_y) in &row_info {
        if avg_y >= max_y - TOP_ROW_Y_THRESHOLD && min_x < best_min_x {
            title_row_idx = i;
            best_min_x = min_x;
        }
    }

    let mut title_row = rows[title_row_idx].clone();
    title_row.sort_by(|a, b| a.x.total_cmp(&b.x));
    let title = title_row
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let title_y = title_row[0].y;
    let title_min_x = row_info[title_row_idx].1;
    let title_max_x = title_row
        .iter()
        .map(|l| l.x)
        .fold(f64::NEG_INFINITY, f64::max);

    // Subtitle: the highest row strictly below the title row whose x span
    // overlaps the title row's span (expanded by the tolerance).
    let span_tolerance = config.rightmost_drawing_tolerance;
    let mut subtitle_row_idx: Option<usize> = None;
    let mut best_key = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(i, min_x, avg_y) in &row_info {
        if avg_y >= title_y {
            continue;
        }
        let row_max_x = rows[i]
            .iter()
            .map(|l| l.x)
            .fold(f64::NEG_INFINITY, f64::max);
        if min_x > title_max_x + span_tolerance || row_max_x < title_min_x - span_tolerance {
            continue;
        }
        // Highest row first, then leftmost start; first winner on ties.
        let key = (avg_y, -min_x);
        if key > best_key {
            subtitle_row_idx = Some(i);
            best_key = key;
        }
    }

    let subtitle = subtitle_row_idx.map(|i| {
        let mut row = rows[i].clone();
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut words: Vec<&str> = row.iter().map(|l| l.text.as_str()).collect();
        // A trailing single uppercase letter is a revision suffix, not text.
        if words.len() > 1 && is_single_uppercase_letter(words[words.len() - 1]) {
            words.pop();
        }
        words.join(" ")
    });

    (Some(title), subtitle)
}

/// Group word labels into rows by y proximity, rows ordered
/// top-to-bottom and members left-to-right within a row.
fn group_into_rows(mut labels: Vec<&TextLabel>) -> Vec<Vec<&TextLabel>> {
    labels.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<&TextLabel>> = Vec::new();
    let mut current: Vec<&TextLabel> = Vec::new();
    let mut current_y: Option<f64> = None;

    for label in labels {
        match current_y {
            Some(y) if (label.y - y).abs() > ROW_Y_TOLERANCE => {
                rows.push(std::mem::take(&mut current));
                current.push(label);
            }
            _ => current.push(label),
        }
        current_y = Some(label.y);
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// True for a single uppercase letter, ASCII `A`-`Z` or full-width
/// `Ａ`-`Ｚ`.
fn is_single_uppercase_letter(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_uppercase() || ('\u{FF21}'..='\u{FF3A}').contains(&c),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(labels: &[TextLabel]) -> (Option<String>, Option<String>) {
        resolve_title_and_subtitle(labels, &[], &ResolverConfig::default())
    }

    #[test]
    fn test_title_right_of_marker_below_revision() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("REVISION", 150.0, 80.0),
            TextLabel::new("Gearbox Housing", 120.0, 45.0),
        ];
        let (title, subtitle) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Gearbox Housing"));
        assert_eq!(subtitle, None);
    }

    #[test]
    fn test_no_marker_no_title() {
        let labels = vec![TextLabel::new("Gearbox Housing", 120.0, 45.0)];
        assert_eq!(resolve(&labels), (None, None));
    }

    #[test]
    fn test_multi_word_title_joined_left_to_right() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("Housing", 135.0, 45.0),
            TextLabel::new("Gearbox", 120.0, 45.5),
        ];
        let (title, _) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Gearbox Housing"));
    }

    #[test]
    fn test_rightmost_title_marker_wins() {
        // The left TITLE marker would capture "WRONG"; the rightmost one
        // must be used instead.
        let labels = vec![
            TextLabel::new("TITLE", 0.0, 50.0),
            TextLabel::new("WRONG", 30.0, 45.0),
            TextLabel::new("TITLE", 300.0, 50.0),
            TextLabel::new("Correct", 330.0, 45.0),
        ];
        let (title, _) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Correct"));
    }

    #[test]
    fn test_subtitle_row_below_title() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("Gearbox", 120.0, 45.0),
            TextLabel::new("Housing", 140.0, 45.0),
            TextLabel::new("Left", 120.0, 30.0),
            TextLabel::new("Side", 140.0, 30.0),
        ];
        let (title, subtitle) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Gearbox Housing"));
        assert_eq!(subtitle.as_deref(), Some("Left Side"));
    }

    #[test]
    fn test_subtitle_drops_trailing_revision_letter() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("Gearbox", 120.0, 45.0),
            TextLabel::new("Left", 120.0, 30.0),
            TextLabel::new("Side", 140.0, 30.0),
            TextLabel::new("B", 160.0, 30.0),
        ];
        let (_, subtitle) = resolve(&labels);
        assert_eq!(subtitle.as_deref(), Some("Left Side"));
    }

    #[test]
    fn test_fullwidth_revision_letter_dropped() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("Gearbox", 120.0, 45.0),
            TextLabel::new("Side", 120.0, 30.0),
            TextLabel::new("Ｂ", 140.0, 30.0),
        ];
        let (_, subtitle) = resolve(&labels);
        assert_eq!(subtitle.as_deref(), Some("Side"));
    }

    #[test]
    fn test_drawing_numbers_excluded_from_title() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("DE5313-008-02B", 120.0, 45.0),
            TextLabel::new("Gearbox", 120.0, 40.0),
        ];
        let candidates = vec![NumberCandidate {
            value: "DE5313-008-02B".to_string(),
            x: 120.0,
            y: 45.0,
        }];
        let (title, _) =
            resolve_title_and_subtitle(&labels, &candidates, &ResolverConfig::default());
        assert_eq!(title.as_deref(), Some("Gearbox"));
    }

    #[test]
    fn test_near_duplicate_words_collapse() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("Gearbox", 120.0, 45.0),
            TextLabel::new("Gearbox", 120.3, 45.2),
        ];
        let (title, _) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Gearbox"));
    }

    #[test]
    fn test_words_above_revision_ignored() {
        let labels = vec![
            TextLabel::new("TITLE", 100.0, 50.0),
            TextLabel::new("REVISION", 150.0, 80.0),
            TextLabel::new("NoiseAbove", 120.0, 90.0),
            TextLabel::new("Gearbox", 120.0, 45.0),
        ];
        let (title, _) = resolve(&labels);
        assert_eq!(title.as_deref(), Some("Gearbox"));
    }

    #[test]
    fn test_single_uppercase_letter() {
        assert!(is_single_uppercase_letter("B"));
        assert!(is_single_uppercase_letter("Ｚ"));
        assert!(!is_single_uppercase_letter("b"));
        assert!(!is_single_uppercase_letter("BB"));
        assert!(!is_single_uppercase_letter(""));
    }
}
