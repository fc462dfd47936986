pub mod discovery;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod markup;
pub mod pattern;
pub mod record;
pub mod resolve;
pub mod scanner;
pub mod session;

pub use error::{FetchError, ScanError};
pub use fetch::{Fetcher, HttpFetcher};
pub use filter::{FilterConfig, NoiseFilter};
pub use record::{SourceRecord, VISIBLE_LINKS_SOURCE};
pub use scanner::{ProgressCallback, RecordCallback, Scanner, StatusCallback, Wave};
pub use session::{ScanSession, ScanStatus};
