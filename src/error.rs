use thiserror::Error;

/// Errors surfaced by source loading, batch summarisation and export.
///
/// Parsing never fails: unreadable CSV yields an empty record set instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("source '{name}' is not valid UTF-8 text")]
    Encoding { name: String },

    /// Every file in a batch produced zero records.
    #[error("none of the {attempted} files could be parsed")]
    NoValidFiles { attempted: usize },
}

pub type Result<T> = std::result::Result<T, ReportError>;
