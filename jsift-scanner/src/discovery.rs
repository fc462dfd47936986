use crate::filter::NoiseFilter;
use crate::markup::PageTargets;
use crate::pattern::extract_candidates;
use crate::resolve::{SiteRelation, base_host, classify, is_absolute_http, resolve};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Link-discovered references with these suffixes are fetched and scanned
/// instead of being reported as visible links.
pub const SCAN_TARGET_EXTENSIONS: &[&str] = &[".js", ".json"];

/// What the seed page contributes to a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Filtered link targets, raw as written in the page.
    pub visible_links: Vec<String>,
    /// Absolute script URLs from `<script src>` tags.
    pub tag_scripts: Vec<String>,
    /// Absolute script/data URLs referenced from hrefs or inline code.
    pub link_scripts: Vec<String>,
}

impl Discovery {
    pub fn script_count(&self) -> usize {
        self.tag_scripts.len() + self.link_scripts.len()
    }
}

/// Sort the page's raw targets into visible links and the two fetch waves.
pub fn classify_targets(targets: &PageTargets, base: &Url, filter: &NoiseFilter) -> Discovery {
    let mut discovery = Discovery {
        tag_scripts: tag_scripts(&targets.script_sources, base, filter),
        ..Default::default()
    };

    let inline_endpoints = targets
        .inline_scripts
        .iter()
        .flat_map(|body| extract_candidates(body))
        .filter(|candidate| filter.accepts(candidate));

    let mut seen_links = HashSet::new();
    let mut seen_scripts = HashSet::new();

    for reference in targets.hrefs.iter().cloned().chain(inline_endpoints) {
        if is_scan_target(&reference) {
            if let Some(scheme) = filter.excluded_scheme(&reference.trim().to_lowercase()) {
                debug!("Skipping {} (pseudo-scheme {})", reference, scheme);
                continue;
            }
            match resolve(base, &reference) {
                Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                    debug!("Skipping non-HTTP link target {}", url);
                }
                Ok(url) => {
                    let url = url.to_string();
                    if let Some(domain) = filter.excluded_domain(&url.to_lowercase()) {
                        debug!("Skipping {} (excluded domain {})", url, domain);
                    } else if seen_scripts.insert(url.clone()) {
                        discovery.link_scripts.push(url);
                    }
                }
                Err(e) => warn!("Invalid relative link: {}", e),
            }
            continue;
        }

        if filter.accepts(&reference) && seen_links.insert(reference.clone()) {
            discovery.visible_links.push(reference);
        }
    }

    discovery
}

/// A relative reference ending in a script or data extension.
pub fn is_scan_target(reference: &str) -> bool {
    if is_absolute_http(reference) {
        return false;
    }
    let lowered = reference.to_lowercase();
    SCAN_TARGET_EXTENSIONS
        .iter()
        .any(|ext| lowered.ends_with(ext))
}

/// Resolve `<script src>` values, keeping same-site scripts that pass the
/// extension and domain rules. Order is preserved, duplicates dropped.
pub fn tag_scripts(sources: &[String], base: &Url, filter: &NoiseFilter) -> Vec<String> {
    let Some(host) = base_host(base) else {
        warn!("Base URL {} has no host, skipping script tags", base);
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut scripts = Vec::new();

    for src in sources {
        let url = match resolve(base, src) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping script source: {}", e);
                continue;
            }
        };

        if classify(&url, &host) == SiteRelation::CrossSite {
            debug!("Skipping cross-site script {}", url);
            continue;
        }

        let url = url.to_string();
        let lowered = url.to_lowercase();
        if let Some(ext) = filter.excluded_extension(&lowered) {
            debug!("Skipping script {} (excluded extension {})", url, ext);
            continue;
        }
        if let Some(domain) = filter.excluded_domain(&lowered) {
            debug!("Skipping script {} (excluded domain {})", url, domain);
            continue;
        }

        if seen.insert(url.clone()) {
            scripts.push(url);
        }
    }

    scripts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::extract_page_targets;

    fn base() -> Url {
        Url::parse("https://site.example").unwrap()
    }

    #[test]
    fn test_script_tag_and_json_href() {
        let html = r#"<script src="/a.js"></script><a href="/x.json">data</a>"#;
        let targets = extract_page_targets(html);
        let discovery = classify_targets(&targets, &base(), &NoiseFilter::default());

        assert_eq!(discovery.tag_scripts, vec!["https://site.example/a.js"]);
        assert_eq!(discovery.link_scripts, vec!["https://site.example/x.json"]);
        assert!(!discovery.visible_links.iter().any(|l| l.contains("x.json")));
    }

    #[test]
    fn test_visible_links_are_filtered_and_unique() {
        let html = r#"
            <a href="/about">About</a>
            <a href="/about">About again</a>
            <link rel="icon" href="/favicon.ico">
            <a href="https://twitter.com/site">Twitter</a>
            <a href="mailto:hello@site.example">Mail</a>
            <a href="https://site.example/api/docs">Docs</a>
        "#;
        let targets = extract_page_targets(html);
        let discovery = classify_targets(&targets, &base(), &NoiseFilter::default());

        assert_eq!(
            discovery.visible_links,
            vec!["/about", "https://site.example/api/docs"]
        );
        assert_eq!(discovery.script_count(), 0);
    }

    #[test]
    fn test_absolute_script_href_is_a_visible_link() {
        let html = r#"<a href="https://site.example/static/app.js">raw</a>"#;
        let discovery = classify_targets(
            &extract_page_targets(html),
            &base(),
            &NoiseFilter::default(),
        );
        assert_eq!(discovery.visible_links, vec!["https://site.example/static/app.js"]);
        assert!(discovery.link_scripts.is_empty());
    }

    #[test]
    fn test_inline_code_feeds_links_and_scripts() {
        let html = r#"<script>
            fetch("/api/session");
            loadChunk("/static/chunk.js");
            img.src = "/img/hero.png";
        </script>"#;
        let discovery = classify_targets(
            &extract_page_targets(html),
            &base(),
            &NoiseFilter::default(),
        );

        assert_eq!(discovery.visible_links, vec!["/api/session"]);
        assert_eq!(discovery.link_scripts, vec!["https://site.example/static/chunk.js"]);
    }

    #[test]
    fn test_cross_site_and_denied_tag_scripts_are_dropped() {
        let sources = vec![
            "https://cdn.site.example/vendor.js".to_string(),
            "https://other.example/lib.js".to_string(),
            "https://www.googletagmanager.com/gtm.js".to_string(),
            "/module.mjs".to_string(),
            "/main.js".to_string(),
            "/main.js".to_string(),
        ];
        let scripts = tag_scripts(&sources, &base(), &NoiseFilter::default());
        assert_eq!(
            scripts,
            vec![
                "https://cdn.site.example/vendor.js",
                "https://site.example/main.js",
            ]
        );
    }

    #[test]
    fn test_pseudo_scheme_and_non_http_links_are_not_scanned() {
        let html = r#"
            <a href="mailto:team@site.example?subject=app.js">Mail</a>
            <a href="javascript:load('app.js')">Run</a>
            <a href="ftp://files.example/dump.js">Dump</a>
            <a href="/static/real.js">Real</a>
        "#;
        let discovery = classify_targets(
            &extract_page_targets(html),
            &base(),
            &NoiseFilter::default(),
        );

        assert_eq!(discovery.link_scripts, vec!["https://site.example/static/real.js"]);
        assert!(discovery.visible_links.is_empty());
    }

    #[test]
    fn test_is_scan_target() {
        assert!(is_scan_target("/x.json"));
        assert!(is_scan_target("./bundle.JS"));
        assert!(is_scan_target("//cdn.site.example/a.js"));
        assert!(!is_scan_target("https://site.example/a.js"));
        assert!(!is_scan_target("/api/users"));
    }
}
