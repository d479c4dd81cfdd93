//! CLI entry point for the blacklist statistics tool.
//!
//! Loads call-center blacklist exports from files or URLs and reports overall
//! and per-dimension statistics, either as log lines, JSON, or CSV exports.

use anyhow::{Context, Result, bail};
use blacklist_stats::analyzers::{
    BatchReport, Dimension, aggregate_overall, has_multiple_numeric_groups, summarize_batch,
    unique_accounts, unique_groups, unique_provinces,
};
use blacklist_stats::config::Settings;
use blacklist_stats::fetch::{BasicClient, HttpClient};
use blacklist_stats::output::{log_rows, print_json, print_pretty, write_batch_csv, write_rows_csv};
use blacklist_stats::parser::{ParsedSource, parse_with_schema};
use blacklist_stats::record::Record;
use blacklist_stats::source::{SourceFile, load_source};
use blacklist_stats::{ReportError, stats::StatsRow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "blacklist_stats")]
#[command(about = "Aggregate call-center blacklist activity exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overall totals and blacklist rates for one export
    Summary {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Print JSON to stdout instead of log lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Per-group, province, account, or account×province breakdown
    Breakdown {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Dimension to group by
        #[arg(short, long, value_enum, default_value_t = DimensionArg::Group)]
        by: DimensionArg,

        /// Group filter for `province`, account filter for `account-province`
        #[arg(short, long)]
        filter: Option<String>,

        /// CSV file to export the rows to
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Distinct groups, provinces and accounts, for building filters
    Filters {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summarise several exports independently, one row per file
    Batch {
        #[arg(value_name = "FILE_OR_URL", required = true, num_args = 1..)]
        sources: Vec<String>,

        /// CSV file to export the per-file summary to
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch the sample dataset from BLACKLIST_SAMPLE_URL and summarise it
    Sample {
        /// Also print a breakdown along this dimension
        #[arg(short, long, value_enum)]
        by: Option<DimensionArg>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DimensionArg {
    Group,
    Province,
    Account,
    AccountProvince,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Group => Dimension::Group,
            DimensionArg::Province => Dimension::Province,
            DimensionArg::Account => Dimension::Account,
            DimensionArg::AccountProvince => Dimension::AccountProvince,
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    source: &'a str,
    multiple_numeric_groups: bool,
    overall: StatsRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<Vec<StatsRow>>,
}

#[derive(Serialize)]
struct FilterValues {
    groups: Vec<String>,
    provinces: Vec<String>,
    accounts: Vec<String>,
    multiple_numeric_groups: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _file_guard = init_tracing(&settings.log_file_path);

    let cli = Cli::parse();
    let client =
        BasicClient::with_timeout(settings.http_timeout).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Summary { source, json } => {
            let (name, parsed) = load_parsed(&client, &source).await?;
            report_summary(&name, &parsed.records, None, json)?;
        }
        Commands::Breakdown {
            source,
            by,
            filter,
            output,
            json,
        } => {
            let (name, parsed) = load_parsed(&client, &source).await?;
            warn_on_mixed_groups(&name, &parsed.records);

            let rows = Dimension::from(by).aggregate(&parsed.records, filter.as_deref());
            info!(source = %name, dimension = ?by, filter = ?filter, rows = rows.len(), "Breakdown computed");

            if let Some(path) = output {
                write_rows_csv(&path, &rows)
                    .with_context(|| format!("Failed to write breakdown to {path}"))?;
                info!(path = %path, "Breakdown exported");
            }
            emit_rows(&rows, json)?;
        }
        Commands::Filters { source, json } => {
            let (name, parsed) = load_parsed(&client, &source).await?;
            let records = &parsed.records;
            let values = FilterValues {
                groups: unique_groups(records),
                provinces: unique_provinces(records),
                accounts: unique_accounts(records),
                multiple_numeric_groups: has_multiple_numeric_groups(records),
            };

            if json {
                print_json(&values)?;
            } else {
                info!(
                    source = %name,
                    groups = ?values.groups,
                    provinces = ?values.provinces,
                    accounts = ?values.accounts,
                    "Filter values"
                );
                warn_on_mixed_groups(&name, records);
            }
        }
        Commands::Batch {
            sources,
            output,
            json,
        } => {
            run_batch(&client, &sources, output.as_deref(), json).await?;
        }
        Commands::Sample { by, json } => {
            let Some(url) = settings.sample_url.as_deref() else {
                bail!("BLACKLIST_SAMPLE_URL is not set");
            };
            let (name, parsed) = load_parsed(&client, url).await?;
            report_summary(&name, &parsed.records, by.map(Dimension::from), json)?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing(log_file_path: &str) -> WorkerGuard {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("blacklist_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

/// Loads and parses one source; an empty result is a user-facing format error.
async fn load_parsed<C: HttpClient>(client: &C, location: &str) -> Result<(String, ParsedSource)> {
    let source = load_source(client, location)
        .await
        .with_context(|| format!("Failed to load {location}"))?;

    let parsed = parse_with_schema(&source.text);
    if parsed.is_empty() {
        bail!(
            "Cannot parse {}: expected a CSV header row followed by data rows",
            source.name
        );
    }
    info!(source = %source.name, records = parsed.records.len(), schema = ?parsed.schema, "Source parsed");

    Ok((source.name, parsed))
}

fn report_summary(
    name: &str,
    records: &[Record],
    breakdown: Option<Dimension>,
    json: bool,
) -> Result<()> {
    let summary = Summary {
        source: name,
        multiple_numeric_groups: has_multiple_numeric_groups(records),
        overall: aggregate_overall(records),
        breakdown: breakdown.map(|dim| dim.aggregate(records, None)),
    };

    if json {
        print_json(&summary)?;
        return Ok(());
    }

    warn_on_mixed_groups(name, records);
    print_pretty(&summary.overall);
    log_rows(std::slice::from_ref(&summary.overall));
    if let Some(rows) = &summary.breakdown {
        log_rows(rows);
    }
    Ok(())
}

fn emit_rows(rows: &[StatsRow], json: bool) -> Result<()> {
    if json {
        print_json(&rows)?;
    } else {
        log_rows(rows);
    }
    Ok(())
}

fn warn_on_mixed_groups(name: &str, records: &[Record]) {
    if has_multiple_numeric_groups(records) {
        warn!(
            source = %name,
            groups = ?unique_groups(records),
            "Export contains several numeric groups; statistics may mix blacklist rule sets"
        );
    }
}

/// Loads every source, summarises each one on its own and exports the result.
#[tracing::instrument(skip(client, sources), fields(files = sources.len()))]
async fn run_batch<C: HttpClient>(
    client: &C,
    sources: &[String],
    output: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut loaded: Vec<SourceFile> = Vec::with_capacity(sources.len());
    for location in sources {
        match load_source(client, location).await {
            Ok(source) => loaded.push(source),
            Err(e) => error!(source = %location, error = %e, "Failed to load file, skipping"),
        }
    }

    if loaded.is_empty() {
        return Err(ReportError::NoValidFiles {
            attempted: sources.len(),
        }
        .into());
    }

    let results = summarize_batch(&loaded)?;
    let skipped = sources.len() - results.len();
    info!(summarised = results.len(), skipped, "Batch complete");

    let report = BatchReport::new(results);

    if let Some(path) = output {
        write_batch_csv(path, &report).with_context(|| format!("Failed to write batch to {path}"))?;
        info!(path, "Batch exported");
    }

    if json {
        print_json(&report)?;
    } else {
        for file in &report.files {
            info!(
                file = %file.file_name,
                records = file.records.len(),
                total_outbound = file.overall.total_outbound,
                black_outbound_rate = file.overall.black_outbound_rate,
                black_pickup_rate = file.overall.black_pickup_rate,
                black_pay_rate = file.overall.black_pay_rate,
                "File summary"
            );
        }
    }

    Ok(())
}
