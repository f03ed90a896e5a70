//! Log error extraction.

pub mod scanner;
pub mod timestamps;

pub use scanner::{number_errors, parse_log_filename, scan_file, scan_logs, LogOrigin, ScanOutcome};
pub use timestamps::extract_timestamp;
