use serde::Serialize;
use std::collections::HashSet;

/// Source label of the record holding the seed page's own links.
pub const VISIBLE_LINKS_SOURCE: &str = "Visible HTML Links";

/// Endpoints attributed to one source, unique and in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    source: String,
    endpoints: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl SourceRecord {
    pub fn new<I, S>(source: impl Into<String>, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self {
            source: source.into(),
            endpoints: Vec::new(),
            seen: HashSet::new(),
        };
        record.extend(endpoints);
        record
    }

    pub fn visible_links<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(VISIBLE_LINKS_SOURCE, endpoints)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_visible_links(&self) -> bool {
        self.source == VISIBLE_LINKS_SOURCE
    }

    /// Returns false when the endpoint was already present.
    pub fn push(&mut self, endpoint: impl Into<String>) -> bool {
        let endpoint = endpoint.into();
        if self.seen.contains(&endpoint) {
            return false;
        }
        self.seen.insert(endpoint.clone());
        self.endpoints.push(endpoint);
        true
    }

    pub fn extend<I, S>(&mut self, endpoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for endpoint in endpoints {
            self.push(endpoint);
        }
    }

    /// Copy of this record keeping only endpoints that satisfy `keep`.
    pub fn retain_clone(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self::new(
            self.source.clone(),
            self.endpoints.iter().filter(|e| keep(e.as_str())).cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deduplicates_in_order() {
        let record = SourceRecord::new("https://site.example/a.js", ["/b", "/a", "/b", "/c", "/a"]);
        assert_eq!(record.endpoints(), ["/b", "/a", "/c"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_push_reports_duplicates() {
        let mut record = SourceRecord::new("src", Vec::<String>::new());
        assert!(record.push("/x"));
        assert!(!record.push("/x"));
        assert_eq!(record.endpoints(), ["/x"]);
    }

    #[test]
    fn test_visible_links_label() {
        let record = SourceRecord::visible_links(["/about"]);
        assert_eq!(record.source(), VISIBLE_LINKS_SOURCE);
        assert!(record.is_visible_links());
    }

    #[test]
    fn test_serializes_source_then_endpoints() {
        let record = SourceRecord::new("https://site.example/a.js", ["/api/x"]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"source":"https://site.example/a.js","endpoints":["/api/x"]}"#
        );
    }

    #[test]
    fn test_retain_clone() {
        let record = SourceRecord::new("src", ["/api/users", "/static/x", "/api/items"]);
        let kept = record.retain_clone(|e| e.starts_with("/api"));
        assert_eq!(kept.endpoints(), ["/api/users", "/api/items"]);
        assert_eq!(record.len(), 3);
    }
}
