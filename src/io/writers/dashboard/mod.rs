//! Markup helpers shared by the dashboard sections.
//!
//! Every dynamic string goes through [`esc`] (element text) or [`attr`]
//! (double-quoted attribute values). Interactive elements carry
//! `data-action` attributes that a single delegated listener in
//! `dashboard.js` dispatches on; no inline handlers are generated.

pub(super) mod sections;

use crate::config::RenderConfig;
use crate::core::{EmbeddedContent, TestSummaryDocument};
use chrono::{DateTime, FixedOffset};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::borrow::Cow;
use std::cell::Cell;

pub(super) fn esc(text: &str) -> Cow<'_, str> {
    encode_text(text)
}

pub(super) fn attr(text: &str) -> Cow<'_, str> {
    encode_double_quoted_attribute(text)
}

/// JSON made safe for a `<script type="application/json">` block. The
/// escapes are valid JSON string escapes, so parsing yields the same value.
pub(super) fn script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(ch),
        }
    }
    out
}

/// `45s`, `3m`, `2h`, `1d`. Negative spans clamp to zero.
pub fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    match seconds {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// Take the first `limit` characters, reporting whether anything was cut.
pub(super) fn clip(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Render state for one dashboard.
pub(crate) struct RenderContext<'a> {
    pub doc: &'a TestSummaryDocument,
    pub embedded: &'a EmbeddedContent,
    pub limits: &'a RenderConfig,
    generated_at: Option<DateTime<FixedOffset>>,
    next_id: Cell<usize>,
}

impl<'a> RenderContext<'a> {
    pub fn new(doc: &'a TestSummaryDocument, embedded: &'a EmbeddedContent, limits: &'a RenderConfig) -> Self {
        Self {
            doc,
            embedded,
            limits,
            generated_at: DateTime::parse_from_rfc3339(&doc.meta.generated_at).ok(),
            next_id: Cell::new(0),
        }
    }

    /// Element ids unique within the page, in render order.
    pub fn element_id(&self, prefix: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("{prefix}-{id}")
    }

    /// Age of a resource relative to the report's own generation time.
    pub fn age(&self, created: &str) -> String {
        let (Some(now), Ok(created)) = (self.generated_at, DateTime::parse_from_rfc3339(created)) else {
            return "-".to_string();
        };
        format_age((now - created).num_seconds())
    }

    /// File reference; opens the log viewer when the file was embedded.
    pub fn file_tag(&self, file: &str, label: &str) -> String {
        if self.embedded.contains_key(file) {
            format!(
                r#"<code class="file-tag-link" data-action="open-log" data-file="{}" title="{}">{}</code>"#,
                attr(file),
                attr(file),
                esc(label)
            )
        } else {
            format!(r#"<code class="file-tag" title="{}">{}</code>"#, attr(file), esc(label))
        }
    }

    /// Text cut at `limit` characters with an expand control for the rest.
    pub fn expandable(&self, class: &str, text: &str, limit: usize) -> String {
        let (shown, clipped) = clip(text, limit);
        if !clipped {
            return format!(r#"<div class="{}">{}</div>"#, attr(class), esc(text));
        }
        let id = self.element_id("full");
        format!(
            r#"<div class="{class}">{shown}... <span class="expand-link" data-action="expand" data-target="{id}">expand</span></div><div id="{id}" class="{class}-full" hidden>{full}</div>"#,
            class = attr(class),
            shown = esc(shown),
            id = id,
            full = esc(text),
        )
    }
}

/// `Showing first N of M <noun>.` when a table was capped.
pub(super) fn truncation_note(shown: usize, total: usize, noun: &str) -> String {
    if total > shown {
        format!(
            r#"<p class="truncation-note">Showing first {shown} of {total} {}.</p>"#,
            esc(noun)
        )
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age_units() {
        assert_eq!(format_age(45), "45s");
        assert_eq!(format_age(180), "3m");
        assert_eq!(format_age(7_200), "2h");
        assert_eq!(format_age(90_000), "1d");
        assert_eq!(format_age(-5), "0s");
    }

    #[test]
    fn test_script_json_escapes_markup() {
        let json = r#"{"m":"</script><b>&"}"#;
        let safe = script_json(json);
        assert!(!safe.contains('<'));
        assert!(!safe.contains('&'));
        let back: serde_json::Value = serde_json::from_str(&safe).unwrap();
        assert_eq!(back["m"], "</script><b>&");
    }

    #[test]
    fn test_clip_counts_characters() {
        assert_eq!(clip("héllo", 2), ("hé", true));
        assert_eq!(clip("abc", 3), ("abc", false));
    }

    #[test]
    fn test_age_relative_to_generation_time() {
        let mut doc = TestSummaryDocument::default();
        doc.meta.generated_at = "2024-05-01T12:00:00Z".into();
        let embedded = EmbeddedContent::new();
        let limits = RenderConfig::default();
        let ctx = RenderContext::new(&doc, &embedded, &limits);
        assert_eq!(ctx.age("2024-05-01T09:00:00Z"), "3h");
        assert_eq!(ctx.age("2024-04-29T12:00:00Z"), "2d");
        assert_eq!(ctx.age(""), "-");
    }

    #[test]
    fn test_truncation_note() {
        assert_eq!(truncation_note(50, 50, "pods"), "");
        assert!(truncation_note(50, 80, "pods").contains("Showing first 50 of 80 pods."));
    }
}
