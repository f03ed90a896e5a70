use crate::config::RenderConfig;
use crate::io::writers::{HtmlWriter, JsonWriter};
use crate::pipeline::GeneratedSummary;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

pub trait SummaryWriter {
    fn write_summary(&mut self, summary: &GeneratedSummary) -> anyhow::Result<()>;
}

pub fn create_writer<'w, W: Write + 'w>(
    format: OutputFormat,
    writer: W,
    limits: RenderConfig,
) -> Box<dyn SummaryWriter + 'w> {
    match format {
        OutputFormat::Html => Box::new(HtmlWriter::new(writer, limits)),
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
    }
}
