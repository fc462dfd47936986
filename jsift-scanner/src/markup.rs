//! Attribute-level scanning of HTML text.
//!
//! The page is never parsed into a tree. Each concern is a case-insensitive
//! regex over the raw markup, so broken or truncated HTML still yields
//! whatever targets can be recognised.

use regex::Regex;
use std::sync::LazyLock;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(?:a|link)[^>]+href=["']([^"']+)["']"#).expect("href pattern is valid")
});

static SCRIPT_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<script[^>]+src=["']([^"']+)["']"#).expect("script src pattern is valid")
});

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script([^>]*)>(.*?)</script\s*>").expect("script block pattern is valid")
});

static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)src\s*=").expect("src attribute pattern is valid"));

/// Raw targets found in one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTargets {
    /// `href` values of `<a>` and `<link>` elements.
    pub hrefs: Vec<String>,
    /// `src` values of `<script>` elements.
    pub script_sources: Vec<String>,
    /// Bodies of `<script>` elements without a `src` attribute.
    pub inline_scripts: Vec<String>,
}

impl PageTargets {
    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty() && self.script_sources.is_empty() && self.inline_scripts.is_empty()
    }
}

pub fn extract_page_targets(html: &str) -> PageTargets {
    PageTargets {
        hrefs: extract_hrefs(html),
        script_sources: extract_script_sources(html),
        inline_scripts: extract_inline_scripts(html),
    }
}

pub fn extract_hrefs(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_script_sources(html: &str) -> Vec<String> {
    SCRIPT_SRC_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_inline_scripts(html: &str) -> Vec<String> {
    SCRIPT_BLOCK_RE
        .captures_iter(html)
        .filter(|cap| {
            cap.get(1)
                .map(|attrs| !SRC_ATTR_RE.is_match(attrs.as_str()))
                .unwrap_or(true)
        })
        .filter_map(|cap| cap.get(2))
        .map(|m| m.as_str().to_string())
        .filter(|body| !body.trim().is_empty())
        .collect()
}
