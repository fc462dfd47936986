use crate::discovery::classify_targets;
use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::filter::NoiseFilter;
use crate::markup::extract_page_targets;
use crate::pattern::extract_candidates;
use crate::record::SourceRecord;
use crate::resolve::parse_base;
use crate::session::{ScanSession, ScanStatus};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 10;

/// Which discovery path a fetched script came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    ScriptTags,
    Links,
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wave::ScriptTags => write!(f, "script tag"),
            Wave::Links => write!(f, "link"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WaveOutcome {
    dispatched: usize,
    /// Set when cancellation skipped a URL or stopped a task.
    interrupted: bool,
}

/// Called with the wave and URL of each resource right before it is fetched.
pub type ProgressCallback = Arc<dyn Fn(Wave, String) + Send + Sync>;
/// Called once per record as it lands in the session.
pub type RecordCallback = Arc<dyn Fn(&SourceRecord) + Send + Sync>;
/// Called once with the terminal status of a scan.
pub type StatusCallback = Arc<dyn Fn(&ScanStatus) + Send + Sync>;

/// Candidates in `text` that pass `filter`, in source order.
pub fn extract_endpoints(text: &str, filter: &NoiseFilter) -> Vec<String> {
    filter.apply(&extract_candidates(text))
}

pub struct Scanner {
    fetcher: Arc<dyn Fetcher>,
    filter: Arc<NoiseFilter>,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
    record_callback: Option<RecordCallback>,
    status_callback: Option<StatusCallback>,
}

impl Scanner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            filter: Arc::new(NoiseFilter::default()),
            workers: DEFAULT_WORKERS,
            progress_callback: None,
            record_callback: None,
            status_callback: None,
        }
    }

    pub fn with_filter(mut self, filter: NoiseFilter) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_record_callback(mut self, callback: RecordCallback) -> Self {
        self.record_callback = Some(callback);
        self
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status_callback = Some(callback);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn filter(&self) -> &NoiseFilter {
        &self.filter
    }

    /// Scan `seed` into `session`, which is reset first.
    ///
    /// Records are attached to the session as they complete, so whatever was
    /// gathered before a failure or cancellation stays available. A failing
    /// seed fetch is fatal; a failing script fetch only yields an empty record.
    pub async fn scan(
        &self,
        session: &mut ScanSession,
        seed: &str,
        cancel: &CancellationToken,
    ) -> Result<ScanStatus> {
        session.begin(seed);
        info!("Starting scan of {} with {} workers", seed, self.workers);

        let base = match parse_base(seed) {
            Ok(base) => base,
            Err(e) => {
                self.finish(session, ScanStatus::Failed(e.to_string()));
                return Err(e);
            }
        };

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.finish(session, ScanStatus::Cancelled);
                return Err(ScanError::Cancelled);
            }
            result = self.fetcher.fetch(base.as_str()) => result,
        };

        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to load seed page {}: {}", base, e);
                self.finish(session, ScanStatus::Failed(e.to_string()));
                return Err(ScanError::SeedFetch(e));
            }
        };

        let targets = extract_page_targets(&html);
        let discovery = classify_targets(&targets, &base, &self.filter);
        info!(
            "Seed page: {} visible links, {} tag scripts, {} linked scripts",
            discovery.visible_links.len(),
            discovery.tag_scripts.len(),
            discovery.link_scripts.len()
        );

        if !discovery.visible_links.is_empty() {
            self.attach(session, SourceRecord::visible_links(discovery.visible_links));
        }

        let tags = self
            .run_wave(session, Wave::ScriptTags, discovery.tag_scripts, cancel)
            .await;
        let links = if tags.interrupted {
            WaveOutcome::default()
        } else {
            self.run_wave(session, Wave::Links, discovery.link_scripts, cancel)
                .await
        };
        let dispatched = tags.dispatched + links.dispatched;

        // Only a wave that stopped early makes the scan cancelled.
        if tags.interrupted || links.interrupted {
            info!("Scan of {} cancelled", seed);
            self.finish(session, ScanStatus::Cancelled);
            return Err(ScanError::Cancelled);
        }

        let status = if dispatched == 0 {
            ScanStatus::NoResourcesFound
        } else {
            ScanStatus::Complete
        };
        info!(
            "Scan of {} finished: {} records, {} endpoints",
            seed,
            session.records().len(),
            session.endpoint_count()
        );
        self.finish(session, status.clone());
        Ok(status)
    }

    /// Fetch and scan every unclaimed URL of one wave. Returns once all
    /// dispatched tasks have resolved.
    async fn run_wave(
        &self,
        session: &mut ScanSession,
        wave: Wave,
        urls: Vec<String>,
        cancel: &CancellationToken,
    ) -> WaveOutcome {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut outcome = WaveOutcome::default();

        for url in urls {
            if cancel.is_cancelled() {
                outcome.interrupted = true;
                break;
            }
            if !session.claim(&url) {
                debug!("Already fetched {}, skipping", url);
                continue;
            }

            let fetcher = self.fetcher.clone();
            let filter = self.filter.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let progress = self.progress_callback.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    permit = semaphore.acquire_owned() => permit.ok()?,
                };

                if let Some(ref callback) = progress {
                    callback(wave, url.clone());
                }

                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    result = fetcher.fetch(&url) => result,
                };

                let endpoints = match fetched {
                    Ok(body) => extract_endpoints(&body, &filter),
                    Err(e) => {
                        warn!("Could not fetch {}: {}", url, e);
                        Vec::new()
                    }
                };
                debug!("{} endpoints kept from {}", endpoints.len(), url);

                Some(SourceRecord::new(url, endpoints))
            });
            outcome.dispatched += 1;
        }

        debug!("Dispatched {} {} scripts", outcome.dispatched, wave);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => self.attach(session, record),
                Ok(None) => {
                    debug!("Task stopped by cancellation");
                    outcome.interrupted = true;
                }
                Err(e) => warn!("Scan task failed: {}", e),
            }
        }

        outcome
    }

    fn attach(&self, session: &mut ScanSession, record: SourceRecord) {
        let stored = session.push_record(record);
        if let Some(ref callback) = self.record_callback {
            callback(stored);
        }
    }

    fn finish(&self, session: &mut ScanSession, status: ScanStatus) {
        session.set_status(status);
        if let Some(ref callback) = self.status_callback {
            callback(session.status());
        }
    }
}
