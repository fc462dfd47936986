use crate::record::SourceRecord;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Running,
    Complete,
    /// The seed page referenced no script resource worth fetching.
    NoResourcesFound,
    Cancelled,
    Failed(String),
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Idle | ScanStatus::Running)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Idle => write!(f, "idle"),
            ScanStatus::Running => write!(f, "running"),
            ScanStatus::Complete => write!(f, "complete"),
            ScanStatus::NoResourcesFound => write!(f, "no script resources found"),
            ScanStatus::Cancelled => write!(f, "cancelled"),
            ScanStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// State of one scan: the fetch guard and the records collected so far.
///
/// The caller owns the session and hands it to the scanner by `&mut`.
/// [`ScanSession::begin`] is the only reset point.
#[derive(Debug, Clone)]
pub struct ScanSession {
    seed: String,
    fetched: HashSet<String>,
    records: Vec<SourceRecord>,
    status: ScanStatus,
}

impl ScanSession {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            fetched: HashSet::new(),
            records: Vec::new(),
            status: ScanStatus::Idle,
        }
    }

    /// Start over for `seed`, dropping the guard and every record.
    pub fn begin(&mut self, seed: impl Into<String>) {
        self.seed = seed.into();
        self.fetched.clear();
        self.records.clear();
        self.status = ScanStatus::Running;
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: ScanStatus) {
        self.status = status;
    }

    /// Claim `url` for fetching. Returns false if it was already claimed.
    pub fn claim(&mut self, url: &str) -> bool {
        self.fetched.insert(url.to_string())
    }

    pub fn is_claimed(&self, url: &str) -> bool {
        self.fetched.contains(url)
    }

    pub fn claimed_count(&self) -> usize {
        self.fetched.len()
    }

    /// Append a record. A record for a source already present is merged
    /// into the existing one instead.
    pub fn push_record(&mut self, record: SourceRecord) -> &SourceRecord {
        match self
            .records
            .iter()
            .position(|existing| existing.source() == record.source())
        {
            Some(idx) => {
                self.records[idx].extend(record.endpoints().iter().cloned());
                &self.records[idx]
            }
            None => {
                self.records.push(record);
                let last = self.records.len() - 1;
                &self.records[last]
            }
        }
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SourceRecord> {
        self.records
    }

    pub fn endpoint_count(&self) -> usize {
        self.records.iter().map(SourceRecord::len).sum()
    }
}
