use crate::io::output::SummaryWriter;
use crate::pipeline::GeneratedSummary;
use std::io::Write;

/// Writes the bare document. Embedded file content is left out.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> SummaryWriter for JsonWriter<W> {
    fn write_summary(&mut self, summary: &GeneratedSummary) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&summary.document)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
