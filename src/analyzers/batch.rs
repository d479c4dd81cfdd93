//! Per-file summaries for multi-file uploads.
//!
//! Each file is parsed and reduced on its own; nothing is merged across
//! files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzers::aggregate::{Dimension, aggregate_overall};
use crate::error::{ReportError, Result};
use crate::parser::parse_with_schema;
use crate::record::{Record, SchemaKind};
use crate::source::SourceFile;
use crate::stats::StatsRow;

/// Summary of one uploaded file. The parsed records are kept so a detail
/// view can re-aggregate them later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFileResult {
    pub file_name: String,
    pub schema: SchemaKind,
    pub overall: StatsRow,
    pub records: Vec<Record>,
}

impl BatchFileResult {
    /// Breakdown of this file's records along `dimension`.
    pub fn detail(&self, dimension: Dimension, filter: Option<&str>) -> Vec<StatsRow> {
        dimension.aggregate(&self.records, filter)
    }
}

/// Batch output with its generation time, as handed to exporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<BatchFileResult>,
}

impl BatchReport {
    pub fn new(files: Vec<BatchFileResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            files,
        }
    }

    /// `true` if any file carried the complaint columns.
    pub fn has_complaints(&self) -> bool {
        self.files.iter().any(|f| f.schema.has_complaints())
    }
}

/// Parses and summarises a single file. `None` if it yields no records.
pub fn summarize_file(source: &SourceFile) -> Option<BatchFileResult> {
    let parsed = parse_with_schema(&source.text);
    if parsed.is_empty() {
        return None;
    }

    Some(BatchFileResult {
        file_name: source.name.clone(),
        schema: parsed.schema,
        overall: aggregate_overall(&parsed.records),
        records: parsed.records,
    })
}

/// Summarises every file independently, dropping the ones that cannot be
/// parsed. Fails only when no file survives.
pub fn summarize_batch(sources: &[SourceFile]) -> Result<Vec<BatchFileResult>> {
    let mut results = Vec::with_capacity(sources.len());

    for source in sources {
        match summarize_file(source) {
            Some(result) => {
                info!(
                    file = %source.name,
                    records = result.records.len(),
                    total_outbound = result.overall.total_outbound,
                    "File summarised"
                );
                results.push(result);
            }
            None => warn!(file = %source.name, "File has no parseable rows, skipping"),
        }
    }

    if results.is_empty() {
        return Err(ReportError::NoValidFiles {
            attempted: sources.len(),
        });
    }

    Ok(results)
}
