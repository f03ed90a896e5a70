//! Error Pattern Library
//!
//! A fixed, ordered table of log-line classifiers. Scanning tries patterns in
//! table order and the first match owns the line, so the order below decides
//! how ambiguous lines are counted: specific failure signatures come before
//! the generic `error_level` / `exception` catch-alls.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uncompiled table row.
#[derive(Clone, Copy, Debug)]
pub struct PatternDefinition {
    pub name: &'static str,
    pub regex: &'static str,
    pub severity: Severity,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct ErrorPattern {
    pub name: String,
    pub matcher: Regex,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ErrorPatternLibrary {
    patterns: Vec<ErrorPattern>,
}

const STANDARD_PATTERNS: &[PatternDefinition] = &[
    PatternDefinition {
        name: "go_panic",
        regex: r"panic: |goroutine \d+ \[running\]",
        severity: Severity::Critical,
        description: "Go runtime panic",
    },
    PatternDefinition {
        name: "oom_killed",
        regex: r"OOMKilled|(?i:out of memory)",
        severity: Severity::Critical,
        description: "Container killed for exceeding its memory limit",
    },
    PatternDefinition {
        name: "segfault",
        regex: r"Segmentation fault|SIGSEGV|signal 11",
        severity: Severity::Critical,
        description: "Process crashed with a segmentation fault",
    },
    PatternDefinition {
        name: "mongod_fatal",
        regex: r#""s":"F"|Fatal assertion|fassert|Invariant failure"#,
        severity: Severity::Critical,
        description: "mongod fatal assertion",
    },
    PatternDefinition {
        name: "crash_loop",
        regex: r"CrashLoopBackOff|Back-off restarting failed container",
        severity: Severity::Error,
        description: "Container is crash looping",
    },
    PatternDefinition {
        name: "image_pull",
        regex: r"ErrImagePull|ImagePullBackOff|Failed to pull image",
        severity: Severity::Error,
        description: "Container image could not be pulled",
    },
    PatternDefinition {
        name: "reconcile_error",
        regex: r"Reconciler error|(?i:failed to reconcile)|(?i:reconcil\w* failed)",
        severity: Severity::Error,
        description: "Operator reconciliation failed",
    },
    PatternDefinition {
        name: "goal_state",
        regex: r"(?i)(failed to reach|not reached|unable to reach) goal state",
        severity: Severity::Error,
        description: "Automation agent could not reach goal state",
    },
    PatternDefinition {
        name: "auth_failure",
        regex: r"(?i)authentication failed|AuthenticationFailed|SCRAM.*fail|unauthorized",
        severity: Severity::Error,
        description: "Authentication failure",
    },
    PatternDefinition {
        name: "tls_error",
        regex: r"x509: |tls: |(?i:certificate (has expired|is not valid|verify failed))|SSL routines",
        severity: Severity::Error,
        description: "TLS or certificate error",
    },
    PatternDefinition {
        name: "connection_refused",
        regex: r"(?i)connection refused|ECONNREFUSED|HostUnreachable",
        severity: Severity::Error,
        description: "Connection refused or host unreachable",
    },
    PatternDefinition {
        name: "dns_resolution",
        regex: r"no such host|NXDOMAIN|(?i:could not resolve)",
        severity: Severity::Error,
        description: "DNS resolution failure",
    },
    PatternDefinition {
        name: "permission_denied",
        regex: r"(?i)permission denied|\bforbidden\b",
        severity: Severity::Error,
        description: "Permission denied or RBAC forbidden",
    },
    PatternDefinition {
        name: "replset_no_primary",
        regex: r"NotWritablePrimary|NotPrimary|(?i:no primary)|(?i:election (failed|timeout))",
        severity: Severity::Warning,
        description: "Replica set has no primary or an election failed",
    },
    PatternDefinition {
        name: "probe_failed",
        regex: r"Readiness probe failed|Liveness probe failed|Startup probe failed",
        severity: Severity::Warning,
        description: "Kubernetes probe failed",
    },
    PatternDefinition {
        name: "api_conflict",
        regex: r"the object has been modified|Operation cannot be fulfilled",
        severity: Severity::Warning,
        description: "Kubernetes API update conflict",
    },
    PatternDefinition {
        name: "timeout",
        regex: r"(?i)context deadline exceeded|\btimed out\b|\btimeout\b",
        severity: Severity::Warning,
        description: "Operation timed out",
    },
    PatternDefinition {
        name: "error_level",
        regex: r#""level":"error"|level=error|\bERROR\b|"s":"E""#,
        severity: Severity::Error,
        description: "Log line emitted at error level",
    },
    PatternDefinition {
        name: "exception",
        regex: r"Traceback \(most recent call last\)|\b\w+Exception\b",
        severity: Severity::Error,
        description: "Unhandled exception",
    },
];

static STANDARD_LIBRARY: Lazy<ErrorPatternLibrary> = Lazy::new(|| {
    ErrorPatternLibrary::from_definitions(STANDARD_PATTERNS)
        .expect("standard error patterns are valid regexes")
});

impl ErrorPatternLibrary {
    /// The built-in table, compiled once per process.
    pub fn standard() -> &'static ErrorPatternLibrary {
        &STANDARD_LIBRARY
    }

    /// Compile a table, preserving row order as match priority.
    pub fn from_definitions(definitions: &[PatternDefinition]) -> Result<Self, regex::Error> {
        let patterns = definitions
            .iter()
            .map(|def| {
                Ok(ErrorPattern {
                    name: def.name.to_string(),
                    matcher: Regex::new(def.regex)?,
                    severity: def.severity,
                    description: def.description.to_string(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    /// First pattern in priority order that matches `line`.
    pub fn first_match(&self, line: &str) -> Option<&ErrorPattern> {
        self.patterns.iter().find(|p| p.matcher.is_match(line))
    }

    pub fn get(&self, name: &str) -> Option<&ErrorPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    pub fn patterns(&self) -> &[ErrorPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library_compiles() {
        let library = ErrorPatternLibrary::standard();
        assert_eq!(library.len(), STANDARD_PATTERNS.len());
    }

    #[test]
    fn test_pattern_names_are_unique() {
        let library = ErrorPatternLibrary::standard();
        let mut names: Vec<_> = library.patterns().iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), library.len());
    }

    #[test]
    fn test_specific_pattern_wins_over_generic() {
        let library = ErrorPatternLibrary::standard();
        let line = "2024-01-01T00:00:00Z ERROR Reconciler error: failed to create StatefulSet";
        assert_eq!(library.first_match(line).unwrap().name, "reconcile_error");
    }

    #[test]
    fn test_generic_error_level() {
        let library = ErrorPatternLibrary::standard();
        let line = r#"{"level":"error","msg":"something broke"}"#;
        assert_eq!(library.first_match(line).unwrap().name, "error_level");
    }

    #[test]
    fn test_no_match() {
        let library = ErrorPatternLibrary::standard();
        assert!(library
            .first_match("2024-01-01 INFO everything is fine")
            .is_none());
    }

    #[test]
    fn test_lower_index_owns_overlapping_line() {
        let defs = [
            PatternDefinition {
                name: "first",
                regex: "boom",
                severity: Severity::Warning,
                description: "first",
            },
            PatternDefinition {
                name: "second",
                regex: "bo+m",
                severity: Severity::Critical,
                description: "second",
            },
        ];
        let library = ErrorPatternLibrary::from_definitions(&defs).unwrap();
        assert_eq!(library.first_match("a boom here").unwrap().name, "first");
        assert_eq!(library.first_match("a booom here").unwrap().name, "second");
    }

    #[test]
    fn test_invalid_definition_is_rejected() {
        let defs = [PatternDefinition {
            name: "broken",
            regex: "(unclosed",
            severity: Severity::Error,
            description: "broken",
        }];
        assert!(ErrorPatternLibrary::from_definitions(&defs).is_err());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}
