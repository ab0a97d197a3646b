use regex::Regex;

/// Drawing-number shape: two uppercase letters, four digits, then
/// three-digit and two-digit groups and a revision letter,
/// e.g. `DE5313-008-02B`. Matched case-insensitively.
pub const DRAWING_NUMBER_PATTERN: &str = r"[A-Z]{2}\d{4}-\d{3}-\d{2}[A-Z]";

/// Thresholds and patterns for the title-block heuristics.
///
/// Passed explicitly into every resolver call so tests can vary them;
/// there is no shared mutable configuration state.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Candidate pattern for drawing numbers (case-insensitive).
    pub drawing_number_pattern: Regex,
    /// Max distance from a source-drawing marker label to its number.
    pub source_label_proximity: f64,
    /// Max distance from a "DWG No." marker label to its number.
    pub dwg_no_label_proximity: f64,
    /// Horizontal window right of the TITLE label that may hold the title.
    pub title_proximity_x: f64,
    /// X tolerance for grouping the rightmost drawing's numbers together.
    pub rightmost_drawing_tolerance: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            drawing_number_pattern: Regex::new(&format!("(?i){DRAWING_NUMBER_PATTERN}"))
                .expect("built-in pattern is valid"),
            source_label_proximity: 80.0,
            dwg_no_label_proximity: 80.0,
            title_proximity_x: 80.0,
            rightmost_drawing_tolerance: 100.0,
        }
    }
}
