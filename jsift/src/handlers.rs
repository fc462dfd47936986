use anyhow::{Context, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use jsift_core::report::{
    ReportFormat, collect_records, filter_records, format_record, generate_summary, render,
    write_report,
};
use jsift_core::scan::{ScanOptions, ScanOutcome, ScanProgressCallback, ScanRecordCallback, execute_scan};
use jsift_scanner::fetch::DEFAULT_USER_AGENT;
use jsift_scanner::{FilterConfig, ScanStatus, SourceRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use url::Url;

// Helper functions for the scan handler

/// Load seeds from either a hosts file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&str>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        parse_url_line(url.trim()).map(|url| vec![url])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load seeds from a file, one per line. Blank lines and `#` comments are
/// skipped, invalid lines are reported and skipped.
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match parse_url_line(line) {
            Ok(url) => Some(url),
            Err(e) => {
                eprintln!("{} Skipping {}", "⚠".yellow(), e);
                None
            }
        })
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as an http(s) URL, adding https:// when no scheme is given
pub fn parse_url_line(line: &str) -> Result<String, String> {
    let candidate = if line.contains("://") {
        line.to_string()
    } else {
        format!("https://{}", line)
    };

    let url = Url::parse(&candidate).map_err(|e| format!("invalid URL '{}': {}", line, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}' in '{}'", url.scheme(), line));
    }
    if url.host_str().is_none() {
        return Err(format!("no host in '{}'", line));
    }

    Ok(candidate)
}

pub fn build_filter_config(extensions: &[String], domains: &[String]) -> FilterConfig {
    FilterConfig::default()
        .with_extra_extensions(extensions)
        .with_extra_domains(domains)
}

/// `-v` count to the max log level: warn, info, debug, trace
pub fn verbosity_level(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity_level(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn all_failed(outcomes: &[ScanOutcome]) -> bool {
    !outcomes.is_empty()
        && outcomes
            .iter()
            .all(|outcome| matches!(outcome.status, ScanStatus::Failed(_)))
}

pub async fn handle_scan(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    init_logging(sub_matches.get_count("verbose"));

    let url = sub_matches.get_one::<String>("url").map(String::as_str);
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let relay = sub_matches.get_one::<String>("relay").cloned();
    let user_agent = sub_matches
        .get_one::<String>("user-agent")
        .cloned()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let output = sub_matches.get_one::<String>("output");
    let format_name = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .ok_or_else(|| anyhow!("Unknown export format '{}'", format_name))?;
    let grep = sub_matches.get_one::<String>("grep").cloned();
    let extensions: Vec<String> = sub_matches
        .get_many::<String>("exclude-ext")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let domains: Vec<String> = sub_matches
        .get_many::<String>("exclude-domain")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let seeds = load_urls_from_source(url, hosts_file).map_err(|e| anyhow!(e))?;

    if !quiet {
        println!("\n{} Scanning {} host(s)", "→".blue().bold(), seeds.len());
        println!("Workers: {}", threads);
        println!("Timeout: {}s", timeout_secs);
        if let Some(ref relay) = relay {
            println!("Relay: {}", relay);
        }
        if let Some(ref keyword) = grep {
            println!("Keyword: {}", keyword);
        }
        println!();
    }
    info!("Scanning {} seed(s) with {} workers", seeds.len(), threads);

    let options = ScanOptions {
        seeds,
        workers: threads,
        timeout_secs,
        user_agent,
        relay,
        filter: build_filter_config(&extensions, &domains),
        show_progress_bars: !quiet,
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Interrupted, finishing up...", "⚠".yellow().bold());
            signal_token.cancel();
        }
    });

    let progress_callback: ScanProgressCallback = Arc::new(move |msg: String| {
        if !quiet {
            println!("{}", msg);
        }
    });

    let stream_keyword = grep.clone();
    let record_callback: ScanRecordCallback = Arc::new(move |_seed: &str, record: &SourceRecord| {
        if quiet {
            return;
        }
        match stream_keyword {
            Some(ref keyword) => {
                for kept in filter_records(std::slice::from_ref(record), keyword) {
                    println!("{}", format_record(&kept));
                }
            }
            None => println!("{}", format_record(record)),
        }
    });

    let outcomes = execute_scan(
        options,
        Some(progress_callback),
        Some(record_callback),
        cancel.clone(),
    )
    .await
    .context("Could not set up the HTTP client")?;

    if !quiet {
        println!("\n{} Scan finished\n", "✓".green().bold());
        print!("{}", generate_summary(&outcomes));
    }

    let mut records = collect_records(&outcomes);
    if let Some(ref keyword) = grep {
        records = filter_records(&records, keyword);
    }
    let content = render(&records, format).context("Failed to serialize records")?;

    match output {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            let path = Path::new(expanded.as_ref());
            write_report(path, &content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!(
                    "{} Report saved: {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => println!("{}", content),
    }

    if cancel.is_cancelled() {
        bail!("Scan interrupted");
    }
    if all_failed(&outcomes) {
        bail!("No host could be scanned");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed() {
        let failed = ScanOutcome {
            seed: "https://a.example".into(),
            status: ScanStatus::Failed("refused".into()),
            records: vec![],
        };
        let complete = ScanOutcome {
            seed: "https://b.example".into(),
            status: ScanStatus::Complete,
            records: vec![],
        };

        assert!(all_failed(std::slice::from_ref(&failed)));
        assert!(!all_failed(&[failed, complete]));
        assert!(!all_failed(&[]));
    }
}
