//! Acceptance gate for extracted candidates.
//!
//! Extraction over-approximates. Every candidate has to pass all
//! five predicates below before it is reported as an endpoint.

use std::fmt;
use tracing::debug;

/// Upper bound (exclusive) on candidate length in characters.
pub const MAX_CANDIDATE_LENGTH: usize = 300;

const EXCLUDED_EXTENSIONS: &[&str] = &[
    // fonts
    ".woff", ".woff2", ".ttf", ".otf", ".eot",
    // images
    ".png", ".jpg", ".jpeg", ".svg", ".gif", ".ico", ".webp", ".bmp", ".tif", ".tiff", ".avif",
    // styles
    ".css", ".scss", ".less",
    // audio / video
    ".mp4", ".m4v", ".webm", ".mp3", ".wav", ".ogg", ".avi", ".mov", ".flac",
    // archives
    ".zip", ".tar", ".gz", ".tgz", ".rar", ".7z", ".bz2",
    // executables
    ".exe", ".dll", ".msi", ".dmg", ".apk", ".bin", ".deb", ".rpm",
    // logs
    ".log",
    // documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".csv",
    // data, sourcemaps, modules
    ".json", ".map", ".mjs",
];

const EXCLUDED_DOMAINS: &[&str] = &[
    "facebook.com", "facebook.net", "fbcdn.net", "instagram.com", "twitter.com",
    "tiktok.com", "linkedin.com", "pinterest.com", "reddit.com", "youtube.com", "ytimg.com",
    "vimeo.com", "google.com", "gstatic.com", "fonts.googleapis.com",
    "googletagmanager.com", "google-analytics.com", "googlesyndication.com",
    "googleadservices.com", "doubleclick.net", "cdn.adobedtm.com", "omtrdc.net",
    "demdex.net", "scene7.com", "helix-rum-js", "cookielaw.org", "onetrust.com",
    "hotjar.com", "segment.io", "segment.com", "mixpanel.com", "newrelic.com", "nr-data.net",
    "sentry.io", "optimizely.com", "bing.com", "clarity.ms", "cloudflareinsights.com",
    "jsdelivr.net", "unpkg.com", "cdnjs.cloudflare.com", "gravatar.com", "w3.org",
];

const EXCLUDED_SCHEMES: &[&str] = &[
    "javascript:", "data:", "blob:", "file:", "mailto:", "tel:", "sms:", "about:",
    "chrome:", "chrome-extension:", "moz-extension:", "safari-extension:", "edge:",
    "view-source:", "resource:", "intent:",
];

const ENCODED_MARKERS: &[&str] = &["base64"];

/// Rule sets for the noise filter. Entries are matched against the
/// lowercased candidate, so they are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub excluded_extensions: Vec<String>,
    pub excluded_domains: Vec<String>,
    pub excluded_schemes: Vec<String>,
    pub encoded_markers: Vec<String>,
    pub max_length: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_extensions: to_owned(EXCLUDED_EXTENSIONS),
            excluded_domains: to_owned(EXCLUDED_DOMAINS),
            excluded_schemes: to_owned(EXCLUDED_SCHEMES),
            encoded_markers: to_owned(ENCODED_MARKERS),
            max_length: MAX_CANDIDATE_LENGTH,
        }
    }
}

impl FilterConfig {
    /// Add suffixes to the extension denylist. A missing leading dot is added.
    pub fn with_extra_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.is_empty() {
                continue;
            }
            let ext = if ext.starts_with('.') { ext } else { format!(".{}", ext) };
            if !self.excluded_extensions.contains(&ext) {
                self.excluded_extensions.push(ext);
            }
        }
        self
    }

    pub fn with_extra_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for domain in domains {
            let domain = domain.as_ref().trim().to_lowercase();
            if !domain.is_empty() && !self.excluded_domains.contains(&domain) {
                self.excluded_domains.push(domain);
            }
        }
        self
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The predicate a candidate failed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Extension(String),
    Domain(String),
    Scheme(String),
    Encoded(String),
    TooLong(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Extension(ext) => write!(f, "excluded extension {}", ext),
            Rejection::Domain(domain) => write!(f, "excluded domain {}", domain),
            Rejection::Scheme(scheme) => write!(f, "pseudo-scheme {}", scheme),
            Rejection::Encoded(marker) => write!(f, "encoded blob ({})", marker),
            Rejection::TooLong(len) => write!(f, "too long ({} chars)", len),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    config: FilterConfig,
}

impl NoiseFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        match self.rejection(candidate) {
            Some(reason) => {
                debug!("Rejected {:?}: {}", candidate, reason);
                false
            }
            None => true,
        }
    }

    pub fn rejection(&self, candidate: &str) -> Option<Rejection> {
        let lowered = candidate.to_lowercase();

        if let Some(ext) = self.excluded_extension(&lowered) {
            return Some(Rejection::Extension(ext.to_string()));
        }
        if let Some(domain) = self.excluded_domain(&lowered) {
            return Some(Rejection::Domain(domain.to_string()));
        }
        if let Some(scheme) = self.excluded_scheme(&lowered) {
            return Some(Rejection::Scheme(scheme.to_string()));
        }
        if let Some(marker) = self
            .config
            .encoded_markers
            .iter()
            .find(|marker| lowered.contains(marker.as_str()))
        {
            return Some(Rejection::Encoded(marker.clone()));
        }

        let len = candidate.chars().count();
        if len >= self.config.max_length {
            return Some(Rejection::TooLong(len));
        }

        None
    }

    /// Extension predicate alone, on an already lowercased string.
    pub fn excluded_extension(&self, lowered: &str) -> Option<&str> {
        self.config
            .excluded_extensions
            .iter()
            .find(|ext| lowered.ends_with(ext.as_str()))
            .map(String::as_str)
    }

    /// Domain predicate alone, on an already lowercased string.
    pub fn excluded_domain(&self, lowered: &str) -> Option<&str> {
        self.config
            .excluded_domains
            .iter()
            .find(|domain| lowered.contains(domain.as_str()))
            .map(String::as_str)
    }

    /// Scheme predicate alone, on an already lowercased string.
    pub fn excluded_scheme(&self, lowered: &str) -> Option<&str> {
        self.config
            .excluded_schemes
            .iter()
            .find(|scheme| lowered.starts_with(scheme.as_str()))
            .map(String::as_str)
    }

    /// Keep accepted candidates in their original order.
    pub fn apply<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| self.accepts(c.as_ref()))
            .map(|c| c.as_ref().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NoiseFilter {
        NoiseFilter::default()
    }

    #[test]
    fn test_accepts_api_paths() {
        let f = filter();
        assert!(f.accepts("/api/v1/users?active=true"));
        assert!(f.accepts("https://api.site.example/graphql"));
        assert!(f.accepts("./chunks/view"));
        assert!(f.accepts("/static/app.js"));
    }

    #[test]
    fn test_extension_denylist_always_rejects() {
        let f = filter();
        for candidate in [
            "/fonts/a.woff2",
            "/img/LOGO.PNG",
            "/api/export.pdf",
            "/bundle.js.map",
            "/data/config.json",
            "https://api.site.example/v1/report.zip",
            "/logs/app.log",
        ] {
            assert!(
                matches!(f.rejection(candidate), Some(Rejection::Extension(_))),
                "{} should be rejected by extension",
                candidate
            );
        }
    }

    #[test]
    fn test_extension_wins_over_other_predicates() {
        let f = filter();
        let candidate = "data:https://www.google.com/base64/x.png";
        assert!(matches!(f.rejection(candidate), Some(Rejection::Extension(_))));
    }

    #[test]
    fn test_domain_denylist() {
        let f = filter();
        assert_eq!(
            f.rejection("https://www.googletagmanager.com/gtm.js?id=1"),
            Some(Rejection::Domain("googletagmanager.com".to_string()))
        );
        assert!(!f.accepts("//connect.FACEBOOK.net/en_US/sdk.js"));
    }

    #[test]
    fn test_pseudo_schemes() {
        let f = filter();
        for candidate in [
            "javascript:void(0)",
            "mailto:someone@site.example",
            "tel:+15550100",
            "blob:https://site.example/uuid",
            "chrome-extension://abc/page",
            "about:blank",
        ] {
            assert!(
                matches!(f.rejection(candidate), Some(Rejection::Scheme(_))),
                "{} should be rejected by scheme",
                candidate
            );
        }
    }

    #[test]
    fn test_base64_blob() {
        let f = filter();
        assert!(!f.accepts("data:image/png;base64,ABCD=="));
        assert!(matches!(
            f.rejection("/img?src=BASE64:abcd"),
            Some(Rejection::Encoded(_))
        ));
    }

    #[test]
    fn test_length_ceiling() {
        let f = filter();
        let just_under = format!("/{}", "a".repeat(MAX_CANDIDATE_LENGTH - 2));
        let at_limit = format!("/{}", "a".repeat(MAX_CANDIDATE_LENGTH - 1));
        assert!(f.accepts(&just_under));
        assert_eq!(
            f.rejection(&at_limit),
            Some(Rejection::TooLong(MAX_CANDIDATE_LENGTH))
        );
    }

    #[test]
    fn test_apply_preserves_order_and_duplicates() {
        let f = filter();
        let input = ["/b", "/a.png", "/a", "/b"];
        assert_eq!(f.apply(&input), vec!["/b", "/a", "/b"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let f = filter();
        let input = vec![
            "/api/one".to_string(),
            "/x.css".to_string(),
            "https://google.com/x".to_string(),
            "mailto:a@b.c".to_string(),
            "/api/two?x=1".to_string(),
            "/api/one".to_string(),
        ];
        let once = f.apply(&input);
        let twice = f.apply(&once);
        assert_eq!(once, twice);
        assert_eq!(once, vec!["/api/one", "/api/two?x=1", "/api/one"]);
    }

    #[test]
    fn test_extra_extensions_and_domains() {
        let config = FilterConfig::default()
            .with_extra_extensions(["php", ".ASPX", ""])
            .with_extra_domains(["Tracker.Example"]);
        let f = NoiseFilter::new(config);

        assert!(!f.accepts("/index.php"));
        assert!(!f.accepts("/Default.aspx"));
        assert!(!f.accepts("https://tracker.example/pixel"));
        assert!(f.accepts("/api/items"));
    }

    #[test]
    fn test_extra_extensions_are_not_duplicated() {
        let config = FilterConfig::default().with_extra_extensions([".png", "png"]);
        let count = config
            .excluded_extensions
            .iter()
            .filter(|e| e.as_str() == ".png")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_excluded_scheme_alone() {
        let f = filter();
        assert_eq!(f.excluded_scheme("mailto:team@site.example"), Some("mailto:"));
        assert_eq!(f.excluded_scheme("javascript:void(0)"), Some("javascript:"));
        assert_eq!(f.excluded_scheme("/api/mailto:x"), None);
    }
}
