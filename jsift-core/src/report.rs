// Report export and console summary

use crate::scan::ScanOutcome;
use colored::Colorize;
use jsift_scanner::{ScanStatus, SourceRecord};
use std::fs;
use std::io;
use std::path::Path;

/// Line printed between a record's source and its endpoints in text export
pub const SEPARATOR: &str = "-------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// One block per record: source, separator, endpoints. Blocks are joined
/// by a blank line. No records gives an empty string.
pub fn export_text(records: &[SourceRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "{}\n{}\n{}",
                record.source(),
                SEPARATOR,
                record.endpoints().join("\n")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Records as a JSON array with 2-space indentation.
pub fn export_json(records: &[SourceRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

pub fn render(records: &[SourceRecord], format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(export_text(records)),
        ReportFormat::Json => export_json(records),
    }
}

/// Keep endpoints containing `keyword` (case-insensitive). Records left with
/// no endpoints are dropped. An empty keyword keeps everything.
pub fn filter_records(records: &[SourceRecord], keyword: &str) -> Vec<SourceRecord> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .map(|record| record.retain_clone(|endpoint| endpoint.to_lowercase().contains(&keyword)))
        .filter(|record| !record.is_empty())
        .collect()
}

/// All records of a run, seed by seed, in arrival order
pub fn collect_records(outcomes: &[ScanOutcome]) -> Vec<SourceRecord> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.records.iter().cloned())
        .collect()
}

pub fn write_report(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Console block for one record, as streamed while a scan runs
pub fn format_record(record: &SourceRecord) -> String {
    let mut block = String::new();
    let title = if record.is_visible_links() {
        record.source().bright_magenta().bold().to_string()
    } else {
        record.source().bright_white().bold().to_string()
    };
    block.push_str(&format!("{}\n", title));

    if record.is_empty() {
        block.push_str(&format!("  {}\n", "No endpoints found.".dimmed()));
    } else {
        for (idx, endpoint) in record.endpoints().iter().enumerate() {
            block.push_str(&format!("  {:>3}. {}\n", idx + 1, endpoint));
        }
    }

    block
}

/// Summary of a run
pub fn generate_summary(outcomes: &[ScanOutcome]) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Hosts scanned: {}\n", outcomes.len()));

    let total_sources: usize = outcomes.iter().map(|o| o.records.len()).sum();
    report.push_str(&format!("  Sources recorded: {}\n", total_sources));

    let total_endpoints: usize = outcomes.iter().map(ScanOutcome::endpoint_count).sum();
    report.push_str(&format!("  Endpoints found: {}\n", total_endpoints));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for outcome in outcomes {
        let status = match &outcome.status {
            ScanStatus::Complete => "complete".green().to_string(),
            ScanStatus::NoResourcesFound => "no JS files found".yellow().to_string(),
            ScanStatus::Cancelled => "cancelled".yellow().to_string(),
            ScanStatus::Failed(reason) => format!("error: {}", reason).red().to_string(),
            other => other.to_string(),
        };

        report.push_str(&format!("## {}\n", outcome.seed));
        report.push_str(&format!("  Status: {}\n", status));
        report.push_str(&format!(
            "  {} sources, {} endpoints\n\n",
            outcome.records.len(),
            outcome.endpoint_count()
        ));
    }

    report
}
