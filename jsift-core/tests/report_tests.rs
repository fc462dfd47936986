// Tests for report export and filtering

use jsift_core::report::{
    ReportFormat, collect_records, export_json, export_text, filter_records, generate_summary,
    render, write_report,
};
use jsift_core::scan::ScanOutcome;
use jsift_scanner::{ScanStatus, SourceRecord};
use tempfile::TempDir;

fn sample_records() -> Vec<SourceRecord> {
    vec![
        SourceRecord::visible_links(["/about", "/api/v2"]),
        SourceRecord::new(
            "https://site.example/static/app.js",
            ["/api/v1/users", "/API/v1/Orders", "/static/chunk.js"],
        ),
        SourceRecord::new("https://site.example/vendor.js", Vec::<String>::new()),
    ]
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), None);
}

#[test]
fn test_report_format_extension() {
    assert_eq!(ReportFormat::Text.extension(), "txt");
    assert_eq!(ReportFormat::Json.extension(), "json");
}

// ============================================================================
// Text Export Tests
// ============================================================================

#[test]
fn test_export_text_layout() {
    let records = vec![
        SourceRecord::visible_links(["/about"]),
        SourceRecord::new("https://site.example/a.js", ["/api/a", "/api/b"]),
    ];

    let expected = "Visible HTML Links\n\
                    -------------------------\n\
                    /about\n\
                    \n\
                    https://site.example/a.js\n\
                    -------------------------\n\
                    /api/a\n\
                    /api/b";
    assert_eq!(export_text(&records), expected);
}

#[test]
fn test_export_text_empty() {
    assert_eq!(export_text(&[]), "");
}

#[test]
fn test_export_text_record_without_endpoints() {
    let records = vec![SourceRecord::new("https://site.example/empty.js", Vec::<String>::new())];
    assert_eq!(
        export_text(&records),
        "https://site.example/empty.js\n-------------------------\n"
    );
}

// ============================================================================
// JSON Export Tests
// ============================================================================

#[test]
fn test_export_json_empty() {
    assert_eq!(export_json(&[]).unwrap(), "[]");
}

#[test]
fn test_export_json_layout() {
    let records = vec![SourceRecord::new("https://site.example/a.js", ["/api/a"])];
    let expected = r#"[
  {
    "source": "https://site.example/a.js",
    "endpoints": [
      "/api/a"
    ]
  }
]"#;
    assert_eq!(export_json(&records).unwrap(), expected);
}

#[test]
fn test_export_json_parses_back() {
    let json = export_json(&sample_records()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let array = value.as_array().unwrap();

    assert_eq!(array.len(), 3);
    assert_eq!(array[0]["source"], "Visible HTML Links");
    assert_eq!(array[1]["endpoints"][0], "/api/v1/users");
    assert!(array[2]["endpoints"].as_array().unwrap().is_empty());
}

#[test]
fn test_render_dispatches_on_format() {
    let records = sample_records();
    assert_eq!(render(&records, ReportFormat::Text).unwrap(), export_text(&records));
    assert_eq!(render(&records, ReportFormat::Json).unwrap(), export_json(&records).unwrap());
}

// ============================================================================
// Keyword Filter Tests
// ============================================================================

#[test]
fn test_filter_records_case_insensitive() {
    let filtered = filter_records(&sample_records(), "api/V1");

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].source(), "https://site.example/static/app.js");
    assert_eq!(filtered[0].endpoints(), ["/api/v1/users", "/API/v1/Orders"]);
}

#[test]
fn test_filter_records_drops_emptied_records() {
    let filtered = filter_records(&sample_records(), "about");
    assert_eq!(filtered.len(), 1);
    assert!(filtered[0].is_visible_links());
}

#[test]
fn test_filter_records_no_match() {
    assert!(filter_records(&sample_records(), "graphql").is_empty());
}

#[test]
fn test_filter_records_empty_keyword_keeps_all() {
    let records = sample_records();
    assert_eq!(filter_records(&records, "  "), records);
}

// ============================================================================
// Outcome Aggregation Tests
// ============================================================================

fn outcome(seed: &str, status: ScanStatus, records: Vec<SourceRecord>) -> ScanOutcome {
    ScanOutcome {
        seed: seed.to_string(),
        status,
        records,
    }
}

#[test]
fn test_collect_records_keeps_seed_order() {
    let outcomes = vec![
        outcome(
            "https://a.example",
            ScanStatus::Complete,
            vec![SourceRecord::new("https://a.example/a.js", ["/x"])],
        ),
        outcome("https://b.example", ScanStatus::Failed("refused".into()), vec![]),
        outcome(
            "https://c.example",
            ScanStatus::NoResourcesFound,
            vec![SourceRecord::visible_links(["/c"])],
        ),
    ];

    let records = collect_records(&outcomes);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source(), "https://a.example/a.js");
    assert!(records[1].is_visible_links());
}

#[test]
fn test_generate_summary_counts() {
    let outcomes = vec![
        outcome("https://a.example", ScanStatus::Complete, sample_records()),
        outcome("https://b.example", ScanStatus::Failed("refused".into()), vec![]),
    ];

    let summary = generate_summary(&outcomes);
    assert!(summary.contains("Hosts scanned: 2"));
    assert!(summary.contains("Sources recorded: 3"));
    assert!(summary.contains("Endpoints found: 5"));
    assert!(summary.contains("https://a.example"));
    assert!(summary.contains("refused"));
}

// ============================================================================
// File Output Tests
// ============================================================================

#[test]
fn test_write_report_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("site.json");

    write_report(&path, "[]").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}
