pub mod report;
pub mod scan;

use colored::Colorize;

pub use report::{
    ReportFormat, SEPARATOR, collect_records, export_json, export_text, filter_records,
    format_record, generate_summary, render, write_report,
};
pub use scan::{
    ScanOptions, ScanOutcome, ScanProgressCallback, ScanRecordCallback, display_path,
    execute_scan, execute_scan_with,
};

const BANNER: &str = r#"
     _      _  __ _
    (_)___ (_)/ _| |_
    | / __|| | |_| __|
    | \__ \| |  _| |_
   _/ |___/|_|_|  \__|
  |__/
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "endpoint discovery from page markup and scripts".dimmed(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_white()
    );
}
