//! Markup stripping for rich-text annotation runs.
//!
//! Rich text in drawing files carries inline formatting as `\f…;`-style
//! control codes. Some locales store the escape character as the currency
//! glyph `¥` (U+00A5) instead of `\`, so both are accepted. The output of
//! [`normalize`] is plain comparable text: control codes removed,
//! paragraph breaks flattened to spaces, whitespace collapsed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Font/height/width/color/alignment/tracking runs: `\f…;`, `\H…;`,
/// `\W…;`, `\C…;`, `\A…;`, `\T…;`.
static FORMAT_CODES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[fHWCAT][^;]*;").unwrap());

/// Any remaining `\<code>…;` sequence except the paragraph break `\P`.
static OTHER_CODES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\;|\\[^P\\;][^\\;]*;").unwrap());

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup control codes from a raw rich-text run.
///
/// Structure-bearing codes survive as spaces (`\P` paragraph break, `\~`
/// non-breaking space); everything else formatting-related is dropped.
/// Empty or markup-only input normalizes to the empty string — callers
/// drop labels whose normalized text is empty.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // Normalize the locale escape glyph first so one code path handles both.
    let text = raw.replace('¥', "\\");

    let text = FORMAT_CODES.replace_all(&text, "");
    let text = OTHER_CODES.replace_all(&text, "");

    let text = text.replace("\\~", " ");

    // Literal escapes.
    let text = text.replace("\\\\", "\\");
    let text = text.replace("\\{", "{");
    let text = text.replace("\\}", "}");

    let text = MULTI_SPACE.replace_all(&text, " ");
    let text = text.replace("\\P", " ");

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize("R101"), "R101");
        assert_eq!(normalize("Gearbox Housing"), "Gearbox Housing");
    }

    #[test]
    fn test_format_codes_removed() {
        assert_eq!(normalize(r"\fArial|b0|i0;R101"), "R101");
        assert_eq!(normalize(r"\H2.5;\W0.8;R101"), "R101");
        assert_eq!(normalize(r"\C1;\A1;\T1.2;R101"), "R101");
    }

    #[test]
    fn test_unknown_codes_removed_paragraph_kept() {
        assert_eq!(normalize(r"\Q15;LINE1\PLINE2"), "LINE1 LINE2");
        assert_eq!(normalize(r"\L;under"), "under");
    }

    #[test]
    fn test_paragraph_and_nbsp_become_spaces() {
        assert_eq!(normalize(r"A\PB"), "A B");
        assert_eq!(normalize(r"A\~B"), "A B");
    }

    #[test]
    fn test_yen_glyph_treated_as_escape() {
        assert_eq!(normalize("¥H2.5;R101"), "R101");
        assert_eq!(normalize("A¥PB"), "A B");
    }

    #[test]
    fn test_literal_escapes() {
        assert_eq!(normalize(r"\{x\}"), "{x}");
        assert_eq!(normalize(r"a\\b"), r"a\b");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize("  A   B \tC  "), "A B C");
        assert_eq!(normalize(r"A\P\PB"), "A B");
    }

    #[test]
    fn test_markup_only_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(r"\H2.5;\C1;"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_idempotent_on_normalized_text() {
        for raw in [r"\H2.5;MOTOR\PMOUNT", "  DE5313-008-02B ", "{x} plain"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }
}
