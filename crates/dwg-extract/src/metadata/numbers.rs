//! Drawing-number role assignment.
//!
//! A drawing usually carries its own number plus the number of the
//! drawing it was derived from. Which candidate plays which role is
//! inferred from the filename, from marker labels near the numbers, and
//! finally from raw position (the drawing's own number sits bottom-right
//! in the rightmost title block).

use std::path::Path;

use dwg_label::TextLabel;

use super::{NumberCandidate, euclidean_distance};
use crate::ResolverConfig;

/// Marker text fragment of a source-drawing-number label.
const SOURCE_MARKER: &str = "流用元";

/// Resolve `(main, source)` drawing numbers from the candidate list.
///
/// Invariant: the source number is never equal to the main number; when
/// role assignment would make them equal the source is cleared instead.
pub fn resolve_number_roles(
    candidates: &[NumberCandidate],
    labels: &[TextLabel],
    filename: Option<&str>,
    config: &ResolverConfig,
) -> (Option<String>, Option<String>) {
    match candidates {
        [] => return (None, None),
        [only] => return (Some(only.value.clone()), None),
        _ => {}
    }

    let mut main: Option<String> = None;
    let mut source: Option<String> = None;

    // 1. A candidate matching the filename stem is the drawing's own number.
    if let Some(stem) = filename.and_then(|f| Path::new(f).file_stem()?.to_str()) {
        for candidate in candidates {
            let value = candidate.value.as_str();
            if value == stem || stem.contains(value) || value.contains(stem) {
                log::debug!("main drawing number from filename: {value}");
                main = Some(value.to_string());
                break;
            }
        }
    }

    // 2. The candidate nearest a source-drawing marker label becomes the
    // source number.
    let source_markers: Vec<&TextLabel> = labels
        .iter()
        .filter(|l| l.text.contains(SOURCE_MARKER))
        .collect();
    if !source_markers.is_empty() {
        let nearest = nearest_candidate(candidates, &source_markers, main.as_deref());
        if let Some((candidate, dist)) = nearest
            && dist < config.source_label_proximity
            && Some(candidate.value.as_str()) != main.as_deref()
        {
            log::debug!(
                "source drawing number from marker: {} (distance {dist:.2})",
                candidate.value
            );
            source = Some(candidate.value.clone());
        }
    }

    // 3. When still unresolved, the candidate nearest a "DWG No." marker
    // is the main number.
    if main.is_none() {
        let dwg_markers: Vec<&TextLabel> = labels
            .iter()
            .filter(|l| {
                let squeezed: String = l
                    .text
                    .to_uppercase()
                    .chars()
                    .filter(|c| !matches!(c, '\n' | '\r' | ' '))
                    .collect();
                squeezed.contains("DWG") && squeezed.contains("NO")
            })
            .collect();
        if !dwg_markers.is_empty()
            && let Some((candidate, dist)) = nearest_candidate(candidates, &dwg_markers, None)
            && dist < config.dwg_no_label_proximity
        {
            log::debug!(
                "main drawing number from DWG No. marker: {} (distance {dist:.2})",
                candidate.value
            );
            main = Some(candidate.value.clone());
        }
    }

    // 4. Positional fallback: within the rightmost drawing's x band, the
    // bottom-right-most candidate is the main number, the next distinct
    // one the source.
    if main.is_none() || source.is_none() {
        let max_x = candidates
            .iter()
            .map(|c| c.x)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut rightmost: Vec<&NumberCandidate> = candidates
            .iter()
            .filter(|c| c.x >= max_x - config.rightmost_drawing_tolerance)
            .collect();
        rightmost.sort_by(|a, b| (b.x + b.y).total_cmp(&(a.x + a.y)));

        if main.is_none() {
            main = Some(rightmost[0].value.clone());
        }
        if source.is_none() && rightmost.len() > 1 {
            source = rightmost
                .iter()
                .skip(1)
                .find(|c| Some(c.value.as_str()) != main.as_deref())
                .map(|c| c.value.clone());
        }
    }

    if source == main {
        source = None;
    }
    (main, source)
}

/// The candidate closest to any of the marker labels, skipping a value
/// that already holds a role. Ties keep the earlier candidate.
fn nearest_candidate<'a>(
    candidates: &'a [NumberCandidate],
    markers: &[&TextLabel],
    skip: Option<&str>,
) -> Option<(&'a NumberCandidate, f64)> {
    let mut best: Option<(&NumberCandidate, f64)> = None;
    for candidate in candidates {
        if Some(candidate.value.as_str()) == skip {
            continue;
        }
        for marker in markers {
            let dist = euclidean_distance(candidate.x, candidate.y, marker.x, marker.y);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((candidate, dist));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(value: &str, x: f64, y: f64) -> NumberCandidate {
        NumberCandidate {
            value: value.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn test_no_candidates() {
        let (main, source) =
            resolve_number_roles(&[], &[], None, &ResolverConfig::default());
        assert_eq!(main, None);
        assert_eq!(source, None);
    }

    #[test]
    fn test_single_candidate_is_main() {
        let candidates = vec![candidate("DE5313-008-02B", 500.0, 10.0)];
        let (main, source) =
            resolve_number_roles(&candidates, &[], None, &ResolverConfig::default());
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
        assert_eq!(source, None);
    }

    #[test]
    fn test_filename_stem_picks_main() {
        let candidates = vec![
            candidate("AB1234-567-89C", 100.0, 100.0),
            candidate("DE5313-008-02B", 90.0, 130.0),
        ];
        let (main, source) = resolve_number_roles(
            &candidates,
            &[],
            Some("drawings/DE5313-008-02B.dxf"),
            &ResolverConfig::default(),
        );
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
        // Fallback assigns the other candidate as source.
        assert_eq!(source.as_deref(), Some("AB1234-567-89C"));
    }

    #[test]
    fn test_source_marker_proximity() {
        let labels = vec![TextLabel::new("流用元図番", 50.0, 200.0)];
        let candidates = vec![
            candidate("AB1234-567-89C", 60.0, 195.0),
            candidate("DE5313-008-02B", 500.0, 10.0),
        ];
        let (main, source) = resolve_number_roles(
            &candidates,
            &labels,
            None,
            &ResolverConfig::default(),
        );
        assert_eq!(source.as_deref(), Some("AB1234-567-89C"));
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
    }

    #[test]
    fn test_source_marker_too_far_is_ignored() {
        let labels = vec![TextLabel::new("流用元", 50.0, 500.0)];
        let candidates = vec![
            candidate("AB1234-567-89C", 400.0, 10.0),
            candidate("DE5313-008-02B", 500.0, 20.0),
        ];
        let (main, source) = resolve_number_roles(
            &candidates,
            &labels,
            None,
            &ResolverConfig::default(),
        );
        // Fallback only: both in rightmost band, x+y decides.
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
        assert_eq!(source.as_deref(), Some("AB1234-567-89C"));
    }

    #[test]
    fn test_dwg_no_marker_picks_main() {
        let labels = vec![TextLabel::new("DWG No.", 490.0, 15.0)];
        let candidates = vec![
            candidate("AB1234-567-89C", 100.0, 400.0),
            candidate("DE5313-008-02B", 500.0, 10.0),
        ];
        let (main, _) = resolve_number_roles(
            &candidates,
            &labels,
            None,
            &ResolverConfig::default(),
        );
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
    }

    #[test]
    fn test_dwg_marker_with_linebreak_and_spaces() {
        let labels = vec![TextLabel::new("dwg\n no .", 490.0, 15.0)];
        let candidates = vec![
            candidate("AB1234-567-89C", 100.0, 400.0),
            candidate("DE5313-008-02B", 500.0, 10.0),
        ];
        let (main, _) = resolve_number_roles(
            &candidates,
            &labels,
            None,
            &ResolverConfig::default(),
        );
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
    }

    #[test]
    fn test_positional_fallback_rightmost_band() {
        // The far-left candidate is outside the rightmost band and can
        // take neither role.
        let candidates = vec![
            candidate("XX0000-000-00X", 10.0, 300.0),
            candidate("AB1234-567-89C", 480.0, 100.0),
            candidate("DE5313-008-02B", 500.0, 200.0),
        ];
        let (main, source) =
            resolve_number_roles(&candidates, &[], None, &ResolverConfig::default());
        assert_eq!(main.as_deref(), Some("DE5313-008-02B")); // x+y = 700
        assert_eq!(source.as_deref(), Some("AB1234-567-89C")); // x+y = 580
    }

    #[test]
    fn test_source_never_equals_main() {
        let candidates = vec![
            candidate("DE5313-008-02B", 500.0, 200.0),
            candidate("DE5313-008-02B", 480.0, 100.0),
        ];
        let (main, source) =
            resolve_number_roles(&candidates, &[], None, &ResolverConfig::default());
        assert_eq!(main.as_deref(), Some("DE5313-008-02B"));
        assert_eq!(source, None);
    }
}
