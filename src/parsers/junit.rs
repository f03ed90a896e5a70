//! JUnit XML test report parsing.
//!
//! Counts come from the first `<testsuite>` element's attributes; they are
//! never recomputed from the testcase children. Per-test detail covers every
//! `<testcase>` in the document.

use crate::core::{RunStatus, TestCase, TestCounts, TestRun, TestStatus};
use crate::errors::{Result, SummaryError};
use crate::io::walker::DumpDirectory;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

pub const REPORT_FILE: &str = "myreport.xml";

/// Load `myreport.xml` from the dump. A missing report is not an error.
pub fn load_test_run(dir: &DumpDirectory) -> Result<TestRun> {
    let Some(file) = dir.get(REPORT_FILE) else {
        tracing::debug!("No {} in dump, test status unknown", REPORT_FILE);
        return Ok(TestRun::unknown());
    };
    let content = file.read_to_string()?;
    parse_junit(REPORT_FILE, &content)
}

/// Parse a JUnit report document.
pub fn parse_junit(file: &str, xml: &str) -> Result<TestRun> {
    let mut reader = Reader::from_str(xml);
    let mut run: Option<TestRun> = None;
    let mut cases = Vec::new();
    let mut current: Option<TestCase> = None;
    // A <failure> message wins over an <error> message on the same case.
    let mut failure_seen = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SummaryError::test_report(file, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"testsuite" if run.is_none() => run = Some(suite_summary(file, e)?),
                    b"testcase" => {
                        let case = test_case(file, e)?;
                        if is_empty {
                            cases.push(case);
                        } else {
                            current = Some(case);
                            failure_seen = false;
                        }
                    }
                    b"failure" | b"error" => {
                        let is_failure = e.name().as_ref() == b"failure";
                        if let Some(case) = current.as_mut() {
                            if case.status != TestStatus::Failed || (is_failure && !failure_seen) {
                                case.status = TestStatus::Failed;
                                case.error_message =
                                    Some(attributes(file, e)?.remove("message").unwrap_or_default());
                            }
                            failure_seen |= is_failure;
                        }
                    }
                    b"skipped" => {
                        if let Some(case) = current.as_mut() {
                            if case.status == TestStatus::Passed {
                                case.status = TestStatus::Skipped;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"testcase" => {
                cases.extend(current.take());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut run = run.ok_or_else(|| SummaryError::test_report(file, "no <testsuite> element"))?;
    run.tests.details = cases;
    Ok(run)
}

fn attributes(file: &str, element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SummaryError::test_report(file, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SummaryError::test_report(file, e))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn count(attrs: &HashMap<String, String>, key: &str) -> u32 {
    attrs
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn seconds(attrs: &HashMap<String, String>, key: &str) -> f64 {
    attrs
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

fn suite_summary(file: &str, element: &BytesStart<'_>) -> Result<TestRun> {
    let attrs = attributes(file, element)?;
    let total = count(&attrs, "tests");
    let failures = count(&attrs, "failures");
    let errors = count(&attrs, "errors");
    let skipped = count(&attrs, "skipped");
    // Attribute values are untrusted; the sums must not overflow.
    let failed = failures.saturating_add(errors);

    Ok(TestRun {
        status: if failed > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        },
        duration_seconds: seconds(&attrs, "time"),
        tests: TestCounts {
            total,
            passed: total.saturating_sub(failed.saturating_add(skipped)),
            failed,
            skipped,
            details: Vec::new(),
        },
    })
}

fn test_case(file: &str, element: &BytesStart<'_>) -> Result<TestCase> {
    let mut attrs = attributes(file, element)?;
    Ok(TestCase {
        duration: seconds(&attrs, "time"),
        name: attrs.remove("name").unwrap_or_default(),
        status: TestStatus::Passed,
        error_message: None,
        file: attrs.remove("file").unwrap_or_default(),
        line: attrs.remove("line").unwrap_or_default(),
    })
}
