use indicatif::{ProgressBar, ProgressStyle};
use jsift_scanner::fetch::DEFAULT_USER_AGENT;
use jsift_scanner::scanner::DEFAULT_WORKERS;
use jsift_scanner::{
    FilterConfig, Fetcher, HttpFetcher, NoiseFilter, ScanError, ScanSession, ScanStatus, Scanner,
    SourceRecord, Wave,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

/// Options for configuring a scan run
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub seeds: Vec<String>,
    pub workers: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Prefix every request is routed through, e.g. `https://corsproxy.io/?`
    pub relay: Option<String>,
    pub filter: FilterConfig,
    pub show_progress_bars: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            workers: DEFAULT_WORKERS,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            relay: None,
            filter: FilterConfig::default(),
            show_progress_bars: false,
        }
    }
}

/// Result of scanning one seed
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub seed: String,
    pub status: ScanStatus,
    pub records: Vec<SourceRecord>,
}

impl ScanOutcome {
    pub fn endpoint_count(&self) -> usize {
        self.records.iter().map(SourceRecord::len).sum()
    }
}

/// Callback for reporting scan progress messages
pub type ScanProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for each record as it completes, with the seed it belongs to
pub type ScanRecordCallback = Arc<dyn Fn(&str, &SourceRecord) + Send + Sync>;

/// Path and query of a URL, or the input unchanged when it does not parse
pub fn display_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| match u.query() {
            Some(query) => format!("{}?{}", u.path(), query),
            None => u.path().to_string(),
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a scan over every seed with the HTTP fetcher built from `options`
pub async fn execute_scan(
    options: ScanOptions,
    progress_callback: Option<ScanProgressCallback>,
    record_callback: Option<ScanRecordCallback>,
    cancel: CancellationToken,
) -> Result<Vec<ScanOutcome>, ScanError> {
    let fetcher = HttpFetcher::with_options(
        options.timeout_secs,
        &options.user_agent,
        options.relay.clone(),
    )?;
    Ok(execute_scan_with(Arc::new(fetcher), options, progress_callback, record_callback, cancel).await)
}

/// Execute a scan over every seed through the given fetcher.
///
/// Each seed gets a fresh session. A seed whose page cannot be loaded ends
/// with a failed status and the run moves on to the next seed; cancellation
/// stops the whole run.
pub async fn execute_scan_with(
    fetcher: Arc<dyn Fetcher>,
    options: ScanOptions,
    progress_callback: Option<ScanProgressCallback>,
    record_callback: Option<ScanRecordCallback>,
    cancel: CancellationToken,
) -> Vec<ScanOutcome> {
    let ScanOptions {
        seeds,
        workers,
        filter,
        show_progress_bars,
        ..
    } = options;

    // Single spinner for overall progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching site...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetched_count = Arc::new(AtomicUsize::new(0));

    let count_clone = fetched_count.clone();
    let pb_clone = progress_bar.clone();
    let internal_progress: jsift_scanner::ProgressCallback =
        Arc::new(move |wave: Wave, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Scanning [{}] #{}: {}", wave, count, display_path(&url)));
                pb.tick();
            }
        });

    let mut outcomes = Vec::with_capacity(seeds.len());
    let noise_filter = NoiseFilter::new(filter);

    for (idx, seed) in seeds.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        if let Some(ref callback) = progress_callback
            && seeds.len() > 1
        {
            callback(format!("Scanning host {}/{}: {}", idx + 1, seeds.len(), seed));
        }

        let mut scanner = Scanner::new(fetcher.clone())
            .with_workers(workers)
            .with_filter(noise_filter.clone())
            .with_progress_callback(internal_progress.clone());

        if let Some(ref cb) = record_callback {
            let cb = cb.clone();
            let pb = progress_bar.clone();
            let seed_label = seed.clone();
            scanner = scanner.with_record_callback(Arc::new(move |record: &SourceRecord| {
                match pb {
                    Some(ref pb) => pb.suspend(|| cb(&seed_label, record)),
                    None => cb(&seed_label, record),
                }
            }));
        }

        let mut session = ScanSession::new(seed.clone());
        if let Err(e) = scanner.scan(&mut session, seed, &cancel).await {
            warn!("Scan of {} ended early: {}", seed, e);
            if let Some(ref callback) = progress_callback {
                callback(format!("[!] Failed to scan {}: {}", seed, e));
            }
        }

        outcomes.push(ScanOutcome {
            seed: seed.clone(),
            status: session.status().clone(),
            records: session.into_records(),
        });
    }

    if let Some(ref pb) = progress_bar {
        let total = fetched_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Scan complete! {} scripts fetched", total));
    }

    outcomes
}
