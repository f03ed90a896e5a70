//! Inline excerpts of viewable files for the dashboard's log viewer.
//!
//! Structured files embed from the head, append-only logs from the tail.
//! A running byte total is checked before each file; once a file does not
//! fit, nothing after it is embedded.

use crate::core::{CollectionWarning, EmbedMode, EmbeddedContent, EmbeddedFile};
use crate::errors::Result;
use crate::io::walker::{DumpDirectory, DumpFile};
use crate::naming::{is_resource_dump, is_secret_dump};
use std::collections::VecDeque;
use std::ops::ControlFlow;

const STAGE: &str = "embed";

const VIEWABLE_EXTENSIONS: [&str; 6] = ["log", "txt", "json", "conf", "yaml", "xml"];
const HEAD_EXTENSIONS: [&str; 4] = ["yaml", "json", "conf", "xml"];
const HEAD_SUFFIXES: [&str; 2] = ["describe.txt", "_diagnostics.txt"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedPolicy {
    pub lines: usize,
    pub budget_bytes: usize,
    pub skip_markers: Vec<String>,
}

#[derive(Debug, Default)]
pub struct EmbedOutcome {
    pub content: EmbeddedContent,
    pub total_bytes: usize,
    /// Viewable files left out because the budget ran out.
    pub skipped: Vec<String>,
    pub warnings: Vec<CollectionWarning>,
}

impl EmbedPolicy {
    /// Secret dumps are never viewable, whatever their extension.
    pub fn is_viewable(&self, file: &DumpFile) -> bool {
        if is_secret_dump(&file.name) {
            return false;
        }
        let viewable = file
            .extension()
            .is_some_and(|ext| VIEWABLE_EXTENSIONS.contains(&ext));
        viewable
            && file.size_bytes > 0
            && !self
                .skip_markers
                .iter()
                .any(|marker| file.name.contains(marker.as_str()))
    }
}

pub fn embed_mode(file: &DumpFile) -> EmbedMode {
    let head = file.extension().is_some_and(|ext| HEAD_EXTENSIONS.contains(&ext))
        || is_resource_dump(&file.name)
        || HEAD_SUFFIXES.iter().any(|suffix| file.name.ends_with(suffix));
    if head {
        EmbedMode::Head
    } else {
        EmbedMode::Tail
    }
}

/// Read up to `limit` lines from the head or tail of a file. Lines keep a
/// trailing newline; memory stays bounded by `limit` either way.
pub fn excerpt(file: &DumpFile, mode: EmbedMode, limit: usize) -> Result<EmbeddedFile> {
    let mut kept: VecDeque<String> = VecDeque::with_capacity(limit.min(4096));
    let mut total_lines = 0;

    file.for_each_line(|_, line| {
        total_lines += 1;
        match mode {
            EmbedMode::Head if kept.len() < limit => kept.push_back(line.to_string()),
            EmbedMode::Head => {}
            EmbedMode::Tail => {
                if kept.len() == limit {
                    kept.pop_front();
                }
                if limit > 0 {
                    kept.push_back(line.to_string());
                }
            }
        }
        ControlFlow::Continue(())
    })?;

    let shown_lines = kept.len();
    let mut content = String::new();
    for line in kept {
        content.push_str(&line);
        content.push('\n');
    }

    Ok(EmbeddedFile {
        content,
        total_lines,
        shown_lines,
        truncated: total_lines > limit,
        mode,
    })
}

pub fn embed_files(dir: &DumpDirectory, policy: &EmbedPolicy) -> EmbedOutcome {
    let mut outcome = EmbedOutcome::default();
    let mut exhausted = false;

    for file in dir.files().iter().filter(|f| policy.is_viewable(f)) {
        if exhausted {
            tracing::debug!("Skipping {} (embed budget reached)", file.name);
            outcome.skipped.push(file.name.clone());
            continue;
        }

        let embedded = match excerpt(file, embed_mode(file), policy.lines) {
            Ok(embedded) => embedded,
            Err(err) => {
                tracing::warn!("Could not read {}: {}", file.name, err);
                outcome
                    .warnings
                    .push(CollectionWarning::new(STAGE, Some(&file.name), err.to_string()));
                continue;
            }
        };

        let size = embedded.content.len();
        if outcome.total_bytes + size > policy.budget_bytes {
            tracing::warn!(
                "Skipping {} and later files: embed budget of {} bytes reached",
                file.name,
                policy.budget_bytes
            );
            exhausted = true;
            outcome.skipped.push(file.name.clone());
            continue;
        }

        outcome.total_bytes += size;
        outcome.content.insert(file.name.clone(), embedded);
    }

    if !outcome.skipped.is_empty() {
        outcome.warnings.push(CollectionWarning::new(
            STAGE,
            None,
            format!(
                "{} file(s) not embedded: budget of {} bytes reached",
                outcome.skipped.len(),
                policy.budget_bytes
            ),
        ));
    }

    tracing::info!(
        "Embedded {} files ({} KB)",
        outcome.content.len(),
        outcome.total_bytes / 1024
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn policy(lines: usize, budget_bytes: usize) -> EmbedPolicy {
        EmbedPolicy {
            lines,
            budget_bytes,
            skip_markers: vec!["test-summary".to_string()],
        }
    }

    fn snapshot(files: &[(&str, String)]) -> (TempDir, DumpDirectory) {
        let dir = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let snapshot = DumpDirectory::scan(dir.path()).unwrap();
        (dir, snapshot)
    }

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_modes() {
        let (_tmp, dir) = snapshot(&[
            ("_ns_a-agent.log", "x\n".into()),
            ("_ns_z_pods.txt", "x\n".into()),
            ("_ns_a-pod-describe.txt", "x\n".into()),
            ("_ns_0_diagnostics.txt", "x\n".into()),
            ("_ns_events.txt", "x\n".into()),
            ("myreport.xml", "x\n".into()),
        ]);
        let mode = |name: &str| embed_mode(dir.get(name).unwrap());
        assert_eq!(mode("_ns_a-agent.log"), EmbedMode::Tail);
        assert_eq!(mode("_ns_z_pods.txt"), EmbedMode::Head);
        assert_eq!(mode("_ns_a-pod-describe.txt"), EmbedMode::Head);
        assert_eq!(mode("_ns_0_diagnostics.txt"), EmbedMode::Head);
        assert_eq!(mode("_ns_events.txt"), EmbedMode::Tail);
        assert_eq!(mode("myreport.xml"), EmbedMode::Head);
    }

    #[test]
    fn test_head_and_tail_excerpts() {
        let (_tmp, dir) = snapshot(&[("a.log", numbered(10)), ("a.yaml", numbered(10))]);

        let tail = excerpt(dir.get("a.log").unwrap(), EmbedMode::Tail, 3).unwrap();
        assert_eq!(tail.content, "line 8\nline 9\nline 10\n");
        assert_eq!((tail.total_lines, tail.shown_lines, tail.truncated), (10, 3, true));

        let head = excerpt(dir.get("a.yaml").unwrap(), EmbedMode::Head, 3).unwrap();
        assert_eq!(head.content, "line 1\nline 2\nline 3\n");

        let whole = excerpt(dir.get("a.log").unwrap(), EmbedMode::Tail, 50).unwrap();
        assert!(!whole.truncated);
        assert_eq!(whole.shown_lines, 10);
    }

    #[test]
    fn test_filters() {
        let (_tmp, dir) = snapshot(&[
            ("empty.log", String::new()),
            ("test-summary.html", "<html>".into()),
            ("test-summary.json", "{}".into()),
            ("binary.tar.gz", "x".into()),
            ("kept.log", "x\n".into()),
        ]);
        let outcome = embed_files(&dir, &policy(500, 1024));
        let names: Vec<_> = outcome.content.keys().cloned().collect();
        assert_eq!(names, vec!["kept.log"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_secret_dumps_are_never_embedded() {
        let (_tmp, dir) = snapshot(&[
            ("_ns_z_secret_admin.txt", "password: hunter2\n".into()),
            ("c1__ns_z_secret_tls.txt", "tls.key: abc\n".into()),
            ("_ns_z_configmaps.txt", "kind: ConfigMap\n".into()),
        ]);
        let outcome = embed_files(&dir, &policy(500, 1024));
        assert_eq!(outcome.content.keys().collect::<Vec<_>>(), vec!["_ns_z_configmaps.txt"]);
        assert!(outcome.skipped.is_empty());
        assert!(!policy(500, 1024).is_viewable(dir.get("_ns_z_secret_admin.txt").unwrap()));
    }

    #[test]
    fn test_budget_stops_all_later_embedding() {
        let (_tmp, dir) = snapshot(&[
            ("a.log", "aaaa\n".into()),
            ("b.log", "b".repeat(100)),
            ("c.log", "c\n".into()),
        ]);
        let outcome = embed_files(&dir, &policy(500, 20));
        assert_eq!(outcome.content.keys().collect::<Vec<_>>(), vec!["a.log"]);
        assert_eq!(outcome.skipped, vec!["b.log", "c.log"]);
        assert_eq!(outcome.total_bytes, 5);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].message.contains("2 file(s)"));
    }
}
