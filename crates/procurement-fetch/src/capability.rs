//! Capability-statement PDF batch fetcher.
//!
//! Each SBA capability page embeds its PDF as a base64 string assigned to
//! `gon.pdf_data`. Artifacts already present in the output directory are
//! the resumability ledger: their identifiers are removed from the batch
//! before any request is made.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;

use crate::artifacts::{pdf_artifact_name, write_atomic};
use crate::config::FetchConfig;
use crate::http::{join_url, HttpClient};
use crate::identifiers::{unique_identifiers, validate_each};
use crate::types::{FetchError, FetchResult, PdfBatchReport, PdfOutcome};

/// What a capability page contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePayload {
    /// Base64 text of the embedded PDF.
    Encoded(String),
    /// The page states there is no capability statement.
    NoDocument,
}

fn pdf_data_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"gon\.pdf_data\s*=\s*"([^"]+)""#).expect("static pattern is valid")
    })
}

/// Fetch and save the capability PDF of every identifier not yet on disk.
///
/// Identifiers are validated before any I/O, since each one becomes a file
/// name under `output_dir`. Per-identifier failures are logged and recorded
/// in the report; only a failure to list `output_dir` aborts the batch.
pub async fn fetch_capability_pdfs<S: AsRef<str>>(
    client: &HttpClient,
    config: &FetchConfig,
    identifiers: &[S],
    output_dir: &Path,
) -> FetchResult<PdfBatchReport> {
    validate_each(identifiers)?;

    let fetched = already_fetched(output_dir)?;
    let (pending, skipped_existing) = partition_pending(identifiers, &fetched);

    tracing::info!(
        "{} identifiers to fetch, {} already on disk",
        pending.len(),
        skipped_existing.len()
    );

    let mut report = PdfBatchReport {
        skipped_existing,
        outcomes: Vec::with_capacity(pending.len()),
    };

    for uei in pending {
        let outcome = match fetch_capability_pdf(client, config, &uei, output_dir).await {
            Ok(Some(path)) => {
                tracing::info!("PDF saved for UEI {uei}: {}", path.display());
                PdfOutcome::Saved(path)
            }
            Ok(None) => {
                tracing::info!("no capability statement for UEI {uei}");
                PdfOutcome::NoDocument
            }
            Err(e) => {
                tracing::warn!("error processing UEI {uei}: {e}");
                PdfOutcome::Failed(e)
            }
        };
        report.outcomes.push((uei, outcome));
    }

    tracing::info!(
        "saved {} PDFs, {} without a statement, {} failed",
        report.saved(),
        report.no_document(),
        report.failed()
    );
    Ok(report)
}

/// Fetch one page, decode its payload and write the PDF.
///
/// Returns `Ok(None)` when the page carries the no-document marker.
pub async fn fetch_capability_pdf(
    client: &HttpClient,
    config: &FetchConfig,
    uei: &str,
    output_dir: &Path,
) -> FetchResult<Option<PathBuf>> {
    let url = join_url(&config.capability_base_url, uei);
    let page = client.get(&url).await?.error_for_status()?;

    let encoded = match extract_payload(&page.body, &config.no_document_pattern)? {
        PagePayload::Encoded(text) => text,
        PagePayload::NoDocument => return Ok(None),
    };

    let pdf = decode_payload(&encoded)?;
    let path = write_pdf(output_dir, uei, &pdf)?;
    Ok(Some(path))
}

/// Identifiers with an artifact in `output_dir` (file names minus extension).
///
/// A missing directory means nothing has been fetched yet.
pub fn already_fetched(output_dir: &Path) -> FetchResult<HashSet<String>> {
    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e.into()),
    };

    let mut fetched = HashSet::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            fetched.insert(stem.to_string());
        }
    }
    Ok(fetched)
}

/// Input identifiers not in `fetched`, deduplicated, in input order.
pub fn pending_identifiers<S: AsRef<str>>(
    identifiers: &[S],
    fetched: &HashSet<String>,
) -> Vec<String> {
    partition_pending(identifiers, fetched).0
}

fn partition_pending<S: AsRef<str>>(
    identifiers: &[S],
    fetched: &HashSet<String>,
) -> (Vec<String>, Vec<String>) {
    unique_identifiers(identifiers)
        .into_iter()
        .map(str::to_string)
        .partition(|uei| !fetched.contains(uei))
}

/// Locate the embedded PDF payload, or the no-document marker.
pub fn extract_payload(html: &str, no_document: &Regex) -> FetchResult<PagePayload> {
    if let Some(caps) = pdf_data_pattern().captures(html) {
        return Ok(PagePayload::Encoded(caps[1].to_string()));
    }

    if no_document.is_match(html) {
        return Ok(PagePayload::NoDocument);
    }

    Err(FetchError::Parse(
        "could not find `gon.pdf_data` or a no-document notice in the page".into(),
    ))
}

/// Decode standard base64 into raw PDF bytes.
///
/// Pages sometimes escape `/` as `\/` inside the script literal.
pub fn decode_payload(encoded: &str) -> FetchResult<Vec<u8>> {
    let cleaned: String = encoded
        .replace("\\/", "/")
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| FetchError::Decode(format!("invalid base64: {e}")))
}

/// Write `<output_dir>/<uei>.pdf`, creating the directory if needed.
pub fn write_pdf(output_dir: &Path, uei: &str, pdf: &[u8]) -> FetchResult<PathBuf> {
    let path = output_dir.join(pdf_artifact_name(uei));
    write_atomic(&path, pdf)?;
    Ok(path)
}
