use crate::error::{Result, ScanError};
use tracing::debug;
use url::Url;

/// Where a resolved URL lives relative to the seed's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRelation {
    SameSite,
    CrossSite,
}

/// Parse a seed/base URL, accepting only http and https.
pub fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScanError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw, other
        ))),
    }
}

/// Resolve `reference` against `base` using standard URL resolution
/// (absolute pass-through, scheme-relative, path-relative).
pub fn resolve(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference.trim())
        .map_err(|source| ScanError::Resolution {
            reference: reference.to_string(),
            source,
        })
}

/// Lowercased hostname of `url`, if it has one.
pub fn base_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_ascii_lowercase())
}

/// Same-site means the host equals `base_host` or is a subdomain of it.
pub fn classify(url: &Url, base_host: &str) -> SiteRelation {
    let Some(host) = url.host_str() else {
        return SiteRelation::CrossSite;
    };
    let host = host.to_ascii_lowercase();
    let base_host = base_host.to_ascii_lowercase();

    if host == base_host || host.ends_with(&format!(".{}", base_host)) {
        SiteRelation::SameSite
    } else {
        debug!("{} is cross-site relative to {}", url, base_host);
        SiteRelation::CrossSite
    }
}

/// True when `reference` is already a full http(s) URL.
pub fn is_absolute_http(reference: &str) -> bool {
    let lowered = reference.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}
