pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod record;
pub mod source;
pub mod stats;

pub use error::{ReportError, Result};
