use anyhow::{Context, Result};
use std::io::Write;

use crate::field::Field;
use crate::filter::FilteredView;

/// Write the filtered rows as CSV with the dataset's header.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serialize() only emits the header alongside the first row
    if view.is_empty() {
        csv_writer
            .write_record(Field::ALL.iter().map(|f| f.name()))
            .context("Failed to write CSV header")?;
    }
    for row in view.iter() {
        csv_writer
            .serialize(row)
            .with_context(|| format!("Failed to write row for '{}'", row.song))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write the filtered rows as a JSON array of objects.
pub fn write_json<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, view).context("Failed to write JSON output")
}
