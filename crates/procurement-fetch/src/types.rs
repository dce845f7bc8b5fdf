//! Core data types for fetch outcomes, batch reports, and errors.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

/// Classified result of a single award request.
#[derive(Debug, Clone, PartialEq)]
pub enum AwardOutcome {
    /// HTTP 200 with a JSON body.
    Success(Value),
    /// Any other status, or a 200 whose body was not JSON.
    Failure { status: u16, body: Value },
    /// The request never produced a response (connection, timeout, TLS).
    /// Dropped identifiers appear in neither artifact.
    Dropped { error: String },
}

impl AwardOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AwardOutcome::Success(_))
    }
}

/// Summary of one `fetch_awards` run.
#[derive(Debug, Clone, Serialize)]
pub struct AwardBatchReport {
    pub year: i32,
    pub successful: usize,
    pub unsuccessful: usize,
    /// Identifiers lost to transport errors, in input order.
    pub dropped: Vec<String>,
    pub success_path: PathBuf,
    /// Set only when unsuccessful responses were saved.
    pub failure_path: Option<PathBuf>,
}

/// Classified result of a single capability-statement fetch.
#[derive(Debug)]
pub enum PdfOutcome {
    /// PDF decoded and written to this path.
    Saved(PathBuf),
    /// The page states that the firm has no capability statement.
    NoDocument,
    /// Fetch, parse, decode, or write failed; nothing was written.
    Failed(FetchError),
}

/// Summary of one `fetch_capability_pdfs` run.
#[derive(Debug, Default)]
pub struct PdfBatchReport {
    /// Identifiers excluded up front because their artifact already exists.
    pub skipped_existing: Vec<String>,
    /// One entry per identifier that was actually fetched, in input order.
    pub outcomes: Vec<(String, PdfOutcome)>,
}

impl PdfBatchReport {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, PdfOutcome::Saved(_)))
    }

    pub fn no_document(&self) -> usize {
        self.count(|o| matches!(o, PdfOutcome::NoDocument))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PdfOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&PdfOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Result of the single-shot SAM entity query.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub total_records: Option<u64>,
    pub path: PathBuf,
}

/// Errors that can occur while fetching or persisting procurement data.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote error: HTTP {status} from {url}")]
    Remote { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Convenience result type.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_report_counts() {
        let report = PdfBatchReport {
            skipped_existing: vec!["A0".into()],
            outcomes: vec![
                ("A1".into(), PdfOutcome::Saved(PathBuf::from("A1.pdf"))),
                ("A2".into(), PdfOutcome::NoDocument),
                ("A3".into(), PdfOutcome::Failed(FetchError::Decode("bad".into()))),
                ("A4".into(), PdfOutcome::Saved(PathBuf::from("A4.pdf"))),
            ],
        };
        assert_eq!(report.saved(), 2);
        assert_eq!(report.no_document(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_error_messages() {
        let err = FetchError::Remote {
            status: 404,
            url: "https://example.com/x".into(),
        };
        assert_eq!(err.to_string(), "Remote error: HTTP 404 from https://example.com/x");
        assert!(FetchError::InvalidArgument("empty".into())
            .to_string()
            .starts_with("Invalid argument"));
    }
}
