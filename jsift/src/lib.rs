pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_filter_config, handle_scan, load_urls_from_file, load_urls_from_source, parse_url_line,
    verbosity_level,
};

// Re-export scan and report functionality from jsift-core
pub use jsift_core::report::{ReportFormat, export_json, export_text, filter_records};
pub use jsift_core::scan::{ScanOptions, ScanOutcome, execute_scan};
