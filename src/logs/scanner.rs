//! Log error scanning against the [`ErrorPatternLibrary`].
//!
//! Files are scanned independently and may run on the rayon pool. Records
//! come back unnumbered; [`number_errors`] assigns `err-NNNN` ids afterwards
//! in file order so numbering never depends on scheduling.

use crate::core::{CollectionWarning, ErrorRecord, ErrorSource};
use crate::errors::Result;
use crate::io::walker::{map_files, DumpDirectory, DumpFile};
use crate::naming::decode_location;
use crate::patterns::ErrorPatternLibrary;
use once_cell::sync::Lazy;
use std::ops::ControlFlow;

use super::timestamps::extract_timestamp;

/// `*-container.log` is a subset of `*.log`; [`DumpDirectory::matching`]
/// yields each file once.
pub const LOG_FILE_PATTERNS: [&str; 2] = ["*.log", "*-container.log"];

pub const MESSAGE_LIMIT: usize = 200;
pub const CONTEXT_LIMIT: usize = 500;

const STAGE: &str = "logs";

const ROLE_SUFFIXES: [&str; 14] = [
    "-agent-verbose",
    "-agent-stderr",
    "-agent",
    "-monitoring-agent-verbose",
    "-monitoring-agent-stdout",
    "-monitoring-agent",
    "-mongodb-agent-container",
    "-mongod-container",
    "-mongodb-enterprise-database",
    "-mongodb",
    "-launcher",
    "-readiness",
    "-istio-proxy",
    "-keepalive",
];

/// Longest suffix first so `-monitoring-agent` is not read as `-agent`.
static ROLE_SUFFIXES_BY_LENGTH: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut suffixes = ROLE_SUFFIXES.to_vec();
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));
    suffixes
});

/// Resource label and container role recovered from a log file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogOrigin {
    pub resource: String,
    pub container: String,
}

pub fn parse_log_filename(filename: &str) -> LogOrigin {
    let location = decode_location(filename);
    let rest = location
        .file_prefixes()
        .iter()
        .find_map(|prefix| filename.strip_prefix(prefix.as_str()))
        .unwrap_or(filename);
    let rest = [".log", ".txt", ".json", ".conf"]
        .iter()
        .find_map(|ext| rest.strip_suffix(ext))
        .unwrap_or(rest);

    let (pod, container) = ROLE_SUFFIXES_BY_LENGTH
        .iter()
        .find_map(|suffix| {
            rest.strip_suffix(suffix)
                .map(|pod| (pod, suffix.trim_start_matches('-')))
        })
        .unwrap_or((rest, "unknown"));

    LogOrigin {
        resource: format!("Pod/{}/{}/{}", location.cluster, location.namespace, pod),
        container: container.to_string(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Scan one file, stopping once `cap` records have been emitted.
///
/// Every returned record has an empty `id`.
pub fn scan_file(file: &DumpFile, library: &ErrorPatternLibrary, cap: usize) -> Result<Vec<ErrorRecord>> {
    let origin = parse_log_filename(&file.name);
    let mut records = Vec::new();
    if cap == 0 {
        return Ok(records);
    }

    file.for_each_line(|line_no, line| {
        if let Some(pattern) = library.first_match(line) {
            let trimmed = line.trim();
            records.push(ErrorRecord {
                id: String::new(),
                timestamp: extract_timestamp(line),
                severity: pattern.severity,
                pattern: pattern.name.clone(),
                source: ErrorSource {
                    resource: origin.resource.clone(),
                    container: origin.container.clone(),
                    file: file.name.clone(),
                    line: line_no,
                },
                message: truncate_chars(trimmed, MESSAGE_LIMIT),
                context: truncate_chars(trimmed, CONTEXT_LIMIT),
            });
            if records.len() >= cap {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    })?;

    if records.len() >= cap {
        tracing::debug!("Error cap of {} reached in {}", cap, file.name);
    }
    Ok(records)
}

/// Assign `err-NNNN` ids in order, starting at `err-0000`.
pub fn number_errors(errors: &mut [ErrorRecord]) {
    for (index, error) in errors.iter_mut().enumerate() {
        error.id = format!("err-{:04}", index);
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<CollectionWarning>,
    pub files_scanned: usize,
}

/// Scan every log file of the dump.
pub fn scan_logs(
    dir: &DumpDirectory,
    library: &ErrorPatternLibrary,
    cap: usize,
    parallel: bool,
) -> ScanOutcome {
    let files = dir.matching(&LOG_FILE_PATTERNS);
    let mut outcome = ScanOutcome {
        files_scanned: files.len(),
        ..ScanOutcome::default()
    };

    for (file, result) in map_files(&files, parallel, |f| scan_file(f, library, cap)) {
        match result {
            Ok(records) => outcome.errors.extend(records),
            Err(err) => {
                tracing::warn!("Failed to scan {}: {}", file.name, err);
                outcome
                    .warnings
                    .push(CollectionWarning::new(STAGE, Some(&file.name), err.to_string()));
            }
        }
    }

    number_errors(&mut outcome.errors);
    tracing::debug!(
        files = outcome.files_scanned,
        errors = outcome.errors.len(),
        "Log scan complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn snapshot(files: &[(&str, String)]) -> (TempDir, DumpDirectory) {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let snapshot = DumpDirectory::scan(dir.path()).unwrap();
        (dir, snapshot)
    }

    #[test]
    fn test_parse_log_filename_roles() {
        let origin = parse_log_filename("c1__ns_my-rs-0-monitoring-agent-verbose.log");
        assert_eq!(origin.resource, "Pod/c1/ns/my-rs-0");
        assert_eq!(origin.container, "monitoring-agent-verbose");

        let origin = parse_log_filename("_ns_my-rs-0-mongodb-agent-container.log");
        assert_eq!(origin.resource, "Pod/default/ns/my-rs-0");
        assert_eq!(origin.container, "mongodb-agent-container");

        let origin = parse_log_filename("_ns_my-rs-0-agent.log");
        assert_eq!(origin.container, "agent");
    }

    #[test]
    fn test_parse_log_filename_unknown_role() {
        let origin = parse_log_filename("ns_operator-7d9f-abc.log");
        assert_eq!(origin.resource, "Pod/default/ns/operator-7d9f-abc");
        assert_eq!(origin.container, "unknown");
    }

    #[test]
    fn test_cap_bounds_records_per_file() {
        let noisy = "2024-05-01T10:00:00Z ERROR boom\n".repeat(120);
        let (_tmp, dir) = snapshot(&[("_ns_a-0-agent.log", noisy)]);
        let library = ErrorPatternLibrary::standard();
        let records = scan_file(&dir.files()[0], library, 50).unwrap();
        assert_eq!(records.len(), 50);
        assert_eq!(records[49].source.line, 50);
    }

    #[test]
    fn test_record_fields_and_truncation() {
        let long = format!("2024-05-01 10:00:00 ERROR {}\n", "x".repeat(600));
        let (_tmp, dir) = snapshot(&[("_ns_a-0-launcher.log", format!("ok\n{long}"))]);
        let records = scan_file(&dir.files()[0], ErrorPatternLibrary::standard(), 50).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(record.severity, Severity::Error);
        assert_eq!(record.pattern, "error_level");
        assert_eq!(record.source.line, 2);
        assert_eq!(record.source.container, "launcher");
        assert_eq!(record.message.chars().count(), MESSAGE_LIMIT);
        assert_eq!(record.context.chars().count(), CONTEXT_LIMIT);
    }

    #[test]
    fn test_ids_follow_file_order_with_and_without_parallelism() {
        let (_tmp, dir) = snapshot(&[
            ("_ns_a-0-agent.log", "ERROR one\nERROR two\n".to_string()),
            ("_ns_b-0-mongod-container.log", "panic: three\n".to_string()),
            ("_ns_z_pods.txt", "ERROR not a log\n".to_string()),
        ]);
        let library = ErrorPatternLibrary::standard();
        let sequential = scan_logs(&dir, library, 50, false);
        let parallel = scan_logs(&dir, library, 50, true);
        assert_eq!(sequential.errors, parallel.errors);
        assert_eq!(sequential.files_scanned, 2);

        let ids: Vec<_> = sequential.errors.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["err-0000", "err-0001", "err-0002"]);
        assert_eq!(sequential.errors[2].pattern, "go_panic");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
