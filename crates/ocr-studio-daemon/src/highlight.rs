//! Search-term highlighting for extracted text.
//!
//! Matching is literal (regex metacharacters in the term have no special
//! meaning) and case-insensitive. Occurrences are found left to right and
//! never overlap. The text itself is not escaped: the result pane renders
//! the markup as-is.

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

/// Opening tag placed before every highlighted occurrence.
pub const HIGHLIGHT_OPEN: &str = r#"<span style="background-color: red;">"#;

/// Closing tag placed after every highlighted occurrence.
pub const HIGHLIGHT_CLOSE: &str = "</span>";

/// Build a matcher for `term`, or `None` when nothing should be highlighted.
fn matcher(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }

    match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            // Only reachable for terms beyond the regex size limit.
            warn!("Cannot highlight term of {} bytes: {}", term.len(), e);
            None
        }
    }
}

/// Wrap every case-insensitive occurrence of `term` in a highlight span.
///
/// An empty `term` returns `text` unchanged.
pub fn highlight(text: &str, term: &str) -> String {
    match matcher(term) {
        Some(re) => re
            .replace_all(text, |caps: &Captures| {
                format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE)
            })
            .into_owned(),
        None => text.to_string(),
    }
}

/// Number of occurrences `highlight` would wrap.
pub fn count_matches(text: &str, term: &str) -> usize {
    matcher(term).map_or(0, |re| re.find_iter(text).count())
}

/// Render the result pane: highlighted text in a whitespace-preserving block.
pub fn render_result_pane(text: &str, term: &str) -> String {
    format!(
        r#"<div style="white-space: pre-wrap;">{}</div>"#,
        highlight(text, term)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn span(s: &str) -> String {
        format!("{}{}{}", HIGHLIGHT_OPEN, s, HIGHLIGHT_CLOSE)
    }

    #[test]
    fn test_highlight_all_occurrences() {
        let out = highlight("The cat sat on the mat.", "at");
        assert_eq!(
            out,
            format!("The c{} s{} on the m{}.", span("at"), span("at"), span("at"))
        );
        assert_eq!(count_matches("The cat sat on the mat.", "at"), 3);
    }

    #[test]
    fn test_highlight_is_case_insensitive_and_preserves_case() {
        let out = highlight("Cat and cat and CAT", "cat");
        assert_eq!(
            out,
            format!("{} and {} and {}", span("Cat"), span("cat"), span("CAT"))
        );
    }

    #[test]
    fn test_empty_term_is_identity() {
        let text = "Line one\nLine <two>";
        assert_eq!(highlight(text, ""), text);
        assert_eq!(count_matches(text, ""), 0);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert_eq!(highlight("a.b axb", "."), format!("a{}b axb", span(".")));
        assert_eq!(highlight("f(x) = y*2", "y*"), format!("f(x) = {}2", span("y*")));
        assert_eq!(highlight("no match here", "[a-z]+"), "no match here");
    }

    #[test]
    fn test_overlapping_occurrences_first_wins() {
        assert_eq!(highlight("aaa", "aa"), format!("{}a", span("aa")));
        assert_eq!(highlight("aaaa", "aa"), format!("{}{}", span("aa"), span("aa")));
        assert_eq!(count_matches("aaa", "aa"), 1);
    }

    #[test]
    fn test_non_ascii_text() {
        let out = highlight("नमस्ते world, नमस्ते", "नमस्ते");
        assert_eq!(out, format!("{} world, {}", span("नमस्ते"), span("नमस्ते")));
    }

    #[test]
    fn test_render_result_pane() {
        let pane = render_result_pane("HELLO\nworld", "hello");
        assert_eq!(
            pane,
            format!(
                r#"<div style="white-space: pre-wrap;">{}
world</div>"#,
                span("HELLO")
            )
        );
    }

    proptest! {
        #[test]
        fn prop_stripping_markup_restores_text(
            text in "[a-zA-Z .,\n]{0,80}",
            term in "[a-zA-Z]{1,4}",
        ) {
            let out = highlight(&text, &term);
            let stripped = out.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "");
            prop_assert_eq!(stripped, text.clone());
            prop_assert_eq!(out.matches(HIGHLIGHT_OPEN).count(), count_matches(&text, &term));
        }

        #[test]
        fn prop_term_case_does_not_matter(
            text in "[a-zA-Z ]{0,80}",
            term in "[a-zA-Z]{1,4}",
        ) {
            prop_assert_eq!(
                highlight(&text, &term.to_uppercase()),
                highlight(&text, &term.to_lowercase())
            );
        }

        #[test]
        fn prop_every_occurrence_is_wrapped(
            prefix in "[a-p ]{0,20}",
            suffix in "[a-p ]{0,20}",
        ) {
            // Neither 'q' nor 'z' appears around the needle, so exactly one match exists.
            let text = format!("{}qz{}", prefix, suffix);
            let out = highlight(&text, "QZ");
            let wrapped = span("qz");
            prop_assert!(out.contains(&wrapped));
            prop_assert_eq!(count_matches(&text, "Qz"), 1);
        }

        #[test]
        fn prop_empty_term_identity(text in ".{0,80}") {
            prop_assert_eq!(highlight(&text, ""), text);
        }
    }
}
