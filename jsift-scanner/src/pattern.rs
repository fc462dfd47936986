//! Lexical extraction of quoted URL and path literals.
//!
//! A candidate is the content between a matching pair of quotes when that
//! content has one of three shapes, tried in order:
//!
//! 1. scheme-prefixed (`https://...`, `wss://...`) or scheme-relative (`//...`)
//! 2. path-relative: `/`, `./` or `../` followed by a run of non-space characters
//! 3. a bare file path ending in a short lowercase extension, with an optional query
//!
//! Text is never parsed as code. Whatever the pattern sees between quotes is
//! a candidate, and the noise filter decides what survives.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Content alternatives, without the surrounding quotes.
const SHAPES: &str = concat!(
    r#"(?:[a-zA-Z]{1,10}://|//)[^"']*?"#,
    r#"|(?:/|\./|\.\./)[^"'\s<>]+"#,
    r#"|[a-zA-Z0-9_\-/]+\.[a-z]{1,5}(?:\?[^"'\s]*)?"#,
);

static ENDPOINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r#""({shapes})"|'({shapes})'"#, shapes = SHAPES);
    Regex::new(&pattern).expect("endpoint pattern is valid")
});

/// Byte ranges of each candidate's unquoted content, left to right.
pub fn candidate_spans(text: &str) -> Vec<Range<usize>> {
    ENDPOINT_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| m.range())
        .collect()
}

/// Raw candidates in source order. Duplicates are kept.
pub fn extract_candidates(text: &str) -> Vec<String> {
    candidate_spans(text)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}
