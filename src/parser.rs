//! CSV parser for blacklist activity exports.
//!
//! Columns are looked up by header name, so column order does not matter and
//! missing columns fall back to defaults. Malformed counters are coerced to 0
//! instead of failing the row.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::record::{Record, SchemaKind, UNKNOWN, columns};

/// Records parsed from one source together with the column set it used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    pub records: Vec<Record>,
    pub schema: SchemaKind,
}

impl ParsedSource {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses CSV text into records, preserving input order.
///
/// Returns an empty vector when the text has no data rows or the CSV
/// structure is broken; callers treat that as a format error.
pub fn parse(text: &str) -> Vec<Record> {
    parse_with_schema(text).records
}

/// Like [`parse`], but also reports whether the complaint columns were present.
pub fn parse_with_schema(text: &str) -> ParsedSource {
    if has_unterminated_quote(text) {
        warn!("CSV ends inside a quoted field, discarding input");
        return ParsedSource::default();
    }

    match read_source(text) {
        Ok(parsed) => {
            debug!(
                rows = parsed.records.len(),
                schema = ?parsed.schema,
                "CSV parsed"
            );
            parsed
        }
        Err(e) => {
            warn!(error = %e, "CSV structure invalid, discarding input");
            ParsedSource::default()
        }
    }
}

fn read_source(text: &str) -> csv::Result<ParsedSource> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let cols = ColumnMap::from_headers(rdr.headers()?);

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(cols.record(&row));
    }

    Ok(ParsedSource {
        records,
        schema: cols.schema(),
    })
}

/// Quote state while scanning raw CSV bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// `true` if the text ends inside a quoted field.
///
/// The `csv` reader accepts an unclosed quote and swallows the rest of the
/// input into one field, so this is checked up front. A quote only opens a
/// quoted field at the start of a field, matching the reader.
fn has_unterminated_quote(text: &str) -> bool {
    use QuoteState::*;

    let end = text.bytes().fold(FieldStart, |state, b| match (state, b) {
        (FieldStart, b'"') => Quoted,
        (FieldStart | Unquoted | QuoteInQuoted, b',' | b'\n' | b'\r') => FieldStart,
        (FieldStart | Unquoted, _) => Unquoted,
        (Quoted, b'"') => QuoteInQuoted,
        (Quoted, _) => Quoted,
        (QuoteInQuoted, b'"') => Quoted,
        (QuoteInQuoted, _) => Unquoted,
    });

    end == Quoted
}

/// Header name -> column position, resolved once per file.
struct ColumnMap {
    dt: Option<usize>,
    account: Option<usize>,
    province: Option<usize>,
    group: Option<usize>,
    total_outbound: Option<usize>,
    black_outbound: Option<usize>,
    total_pickup: Option<usize>,
    black_pickup: Option<usize>,
    total_pay: Option<usize>,
    black_pay: Option<usize>,
    total_complain: Option<usize>,
    black_complain: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        Self {
            dt: find(columns::DT),
            account: find(columns::ACCOUNT),
            province: find(columns::PROVINCE),
            group: find(columns::GROUP),
            total_outbound: find(columns::TOTAL_OUTBOUND),
            black_outbound: find(columns::BLACK_OUTBOUND),
            total_pickup: find(columns::TOTAL_PICKUP),
            black_pickup: find(columns::BLACK_PICKUP),
            total_pay: find(columns::TOTAL_PAY),
            black_pay: find(columns::BLACK_PAY),
            total_complain: find(columns::TOTAL_COMPLAIN),
            black_complain: find(columns::BLACK_COMPLAIN),
        }
    }

    fn schema(&self) -> SchemaKind {
        if self.total_complain.is_some() && self.black_complain.is_some() {
            SchemaKind::Extended
        } else {
            SchemaKind::Basic
        }
    }

    fn record(&self, row: &StringRecord) -> Record {
        let text = |idx: Option<usize>| field(row, idx).to_string();
        let label = |idx: Option<usize>| or_unknown(field(row, idx));
        let count = |idx: Option<usize>| parse_count(field(row, idx));

        Record {
            dt: text(self.dt),
            account: label(self.account),
            province: label(self.province),
            group: text(self.group),
            total_outbound_count: count(self.total_outbound),
            black_outbound_count: count(self.black_outbound),
            total_pickup_count: count(self.total_pickup),
            black_pickup_count: count(self.black_pickup),
            total_pay_count: count(self.total_pay),
            black_pay_count: count(self.black_pay),
            total_complain_count: count(self.total_complain),
            black_complain_count: count(self.black_complain),
        }
    }
}

fn field(row: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).unwrap_or("")
}

fn or_unknown(raw: &str) -> String {
    if raw.is_empty() {
        UNKNOWN.to_string()
    } else {
        raw.to_string()
    }
}

/// Base-10 integer prefix of `raw`; anything without leading digits is 0.
pub(crate) fn parse_count(raw: &str) -> u64 {
    let raw = raw.trim();
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    raw[..digits].parse().unwrap_or(0)
}
