use super::dashboard::{esc, script_json, sections, RenderContext};
use crate::io::output::SummaryWriter;
use crate::config::RenderConfig;
use crate::core::{EmbeddedContent, TestSummaryDocument};
use crate::errors::{Result, SummaryError};
use crate::pipeline::GeneratedSummary;
use std::collections::HashMap;
use std::io::Write;

const TEMPLATE: &str = include_str!("templates/dashboard.html");
const STYLES: &str = include_str!("templates/dashboard.css");
const SCRIPT: &str = include_str!("templates/dashboard.js");

pub struct HtmlWriter<W: Write> {
    writer: W,
    limits: RenderConfig,
}

impl<W: Write> HtmlWriter<W> {
    pub fn new(writer: W, limits: RenderConfig) -> Self {
        Self { writer, limits }
    }
}

impl<W: Write> SummaryWriter for HtmlWriter<W> {
    fn write_summary(&mut self, summary: &GeneratedSummary) -> anyhow::Result<()> {
        let html = render_dashboard(&summary.document, &summary.embedded, &self.limits)?;
        self.writer.write_all(html.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Render the self-contained dashboard. Pure: the same document, content
/// and limits always produce the same page.
pub fn render_dashboard(
    doc: &TestSummaryDocument,
    embedded: &EmbeddedContent,
    limits: &RenderConfig,
) -> Result<String> {
    let ctx = RenderContext::new(doc, embedded, limits);
    let pretty = serde_json::to_string_pretty(doc)?;
    let tails = serde_json::to_string(embedded)?;
    let tests = &doc.test_run.tests;

    let values: HashMap<&str, String> = HashMap::from([
        ("STYLES", STYLES.to_string()),
        ("SCRIPT", SCRIPT.to_string()),
        ("STATUS", esc(&doc.meta.status).into_owned()),
        ("STATUS_COLOR", sections::status_color(&doc.meta.status).to_string()),
        ("TEST_NAME", esc(&doc.meta.test_name).into_owned()),
        ("VARIANT", esc(&doc.meta.variant).into_owned()),
        ("TASK_ID", esc(&doc.meta.task_id).into_owned()),
        ("EXECUTION", doc.meta.execution.to_string()),
        ("TEST_TYPE", esc(&doc.meta.test_type).into_owned()),
        ("DURATION", format!("{:.0}s", doc.test_run.duration_seconds)),
        (
            "TEST_COUNTS",
            format!(
                "{} total ({} passed, {} failed, {} skipped)",
                tests.total, tests.passed, tests.failed, tests.skipped
            ),
        ),
        (
            "GENERATED_AT",
            esc(doc.meta.generated_at.get(..19).unwrap_or(&doc.meta.generated_at)).into_owned(),
        ),
        ("QUICK_DIAGNOSIS", sections::quick_diagnosis(&ctx)),
        ("DIAGNOSTICS_LINKS", sections::diagnostics_links(&ctx)),
        ("WARNINGS", sections::warnings_panel(&ctx)),
        ("FAILED_TESTS", sections::failed_tests(&ctx)),
        ("ERROR_CATALOG", sections::error_catalog(&ctx)),
        ("RESOURCES", sections::resource_browser(&ctx)),
        ("TIMELINE", sections::timeline(&ctx)),
        ("ARTIFACTS", sections::artifacts(&ctx)),
        ("JSON_PRETTY", esc(&pretty).into_owned()),
        ("JSON_DATA", script_json(&pretty)),
        ("LOG_TAILS_DATA", script_json(&tails)),
    ]);

    fill_template(TEMPLATE, &values)
}

/// Substitute `{{{NAME}}}` placeholders in one pass over the template, so
/// text inside substituted values is never re-expanded.
fn fill_template(template: &str, values: &HashMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len() + values.values().map(String::len).sum::<usize>());
    let mut rest = template;

    while let Some(start) = rest.find("{{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];
        let end = after
            .find("}}}")
            .ok_or_else(|| SummaryError::Render("unterminated placeholder in template".to_string()))?;
        let key = &after[..end];
        let value = values
            .get(key)
            .ok_or_else(|| SummaryError::Render(format!("no value for placeholder {key}")))?;
        out.push_str(value);
        rest = &after[end + 3..];
    }
    out.push_str(rest);
    Ok(out)
}
