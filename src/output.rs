//! Output formatting and export for computed statistics.
//!
//! Supports structured log lines, pretty JSON on stdout, and CSV export of
//! breakdown rows and batch summaries.

use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::batch::BatchReport;
use crate::error::Result;
use crate::stats::StatsRow;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Writes a value to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Emits one `info` event per row.
pub fn log_rows(rows: &[StatsRow]) {
    for row in rows {
        info!(
            key = %row.label(),
            records = row.record_count,
            total_outbound = row.total_outbound,
            black_outbound = row.black_outbound,
            black_outbound_rate = row.black_outbound_rate,
            black_pickup_rate = row.black_pickup_rate,
            black_pay_rate = row.black_pay_rate,
            black_complain_rate = row.black_complain_rate,
            "Stats row"
        );
    }
}

/// Writes breakdown rows to a CSV file, replacing any existing file.
pub fn write_rows_csv(path: impl AsRef<Path>, rows: &[StatsRow]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = rows.len(), "Writing rows CSV");

    let mut writer = WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Spreadsheet export for a batch: one row per file with flattened stats.
///
/// Complaint columns appear only when some file used the extended schema.
pub fn write_batch_csv(path: impl AsRef<Path>, report: &BatchReport) -> Result<()> {
    let path = path.as_ref();
    let with_complaints = report.has_complaints();
    debug!(
        path = %path.display(),
        files = report.files.len(),
        with_complaints,
        "Writing batch CSV"
    );

    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(batch_header(with_complaints))?;
    for file in &report.files {
        writer.write_record(batch_fields(&file.file_name, &file.overall, with_complaints))?;
    }
    writer.flush()?;

    Ok(())
}

fn batch_header(with_complaints: bool) -> Vec<&'static str> {
    let mut header = vec![
        "file_name",
        "record_count",
        "total_outbound",
        "black_outbound",
        "black_outbound_rate",
        "total_pickup",
        "black_pickup",
        "black_pickup_rate",
        "total_pay",
        "black_pay",
        "black_pay_rate",
    ];
    if with_complaints {
        header.extend(["total_complain", "black_complain", "black_complain_rate"]);
    }
    header
}

fn batch_fields(file_name: &str, s: &StatsRow, with_complaints: bool) -> Vec<String> {
    let mut fields = vec![
        file_name.to_string(),
        s.record_count.to_string(),
        s.total_outbound.to_string(),
        s.black_outbound.to_string(),
        format!("{:.2}", s.black_outbound_rate),
        s.total_pickup.to_string(),
        s.black_pickup.to_string(),
        format!("{:.2}", s.black_pickup_rate),
        s.total_pay.to_string(),
        s.black_pay.to_string(),
        format!("{:.2}", s.black_pay_rate),
    ];
    if with_complaints {
        fields.extend([
            s.total_complain.to_string(),
            s.black_complain.to_string(),
            format!("{:.2}", s.black_complain_rate),
        ]);
    }
    fields
}
