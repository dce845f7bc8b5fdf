//! Award batch fetcher for the USAspending recipient-children endpoint.

use chrono::Datelike;
use serde_json::Value;

use crate::artifacts::{award_artifact_name, unsuccessful_artifact_name, write_json};
use crate::config::FetchConfig;
use crate::http::{join_url, HttpClient};
use crate::identifiers::{unique_identifiers, validate_identifiers};
use crate::types::{AwardBatchReport, AwardOutcome, FetchError, FetchResult};

/// Earliest year accepted by `fetch_awards`.
pub const MIN_AWARD_YEAR: i32 = 1900;

/// Fetch award children for every identifier in `year` and persist them.
///
/// Successful payloads are always written to `awards_to_8a_<year>.json`.
/// Failure bodies go to `unsuccessful_award_fetch_<year>.json` only when
/// `save_unsuccessful` is set. Identifiers whose request fails at the
/// transport level are logged and reported as dropped.
pub async fn fetch_awards<S: AsRef<str>>(
    client: &HttpClient,
    config: &FetchConfig,
    identifiers: &[S],
    year: i32,
    save_unsuccessful: bool,
) -> FetchResult<AwardBatchReport> {
    validate_identifiers(identifiers)?;
    validate_year(year)?;

    let mut successful: Vec<Value> = Vec::new();
    let mut unsuccessful: Vec<Value> = Vec::new();
    let mut dropped: Vec<String> = Vec::new();

    for uei in unique_identifiers(identifiers) {
        match fetch_award(client, config, uei, year).await {
            AwardOutcome::Success(payload) => successful.push(payload),
            AwardOutcome::Failure { status, body } => {
                tracing::warn!("award fetch for UEI {uei} returned HTTP {status}");
                unsuccessful.push(body);
            }
            AwardOutcome::Dropped { error } => {
                tracing::warn!("an error occurred for UEI {uei}: {error}");
                dropped.push(uei.to_string());
            }
        }
    }

    tracing::info!(
        "collected {} successful responses and {} unsuccessful responses ({} dropped)",
        successful.len(),
        unsuccessful.len(),
        dropped.len()
    );

    let award_dir = config.award_dir();
    let success_path = award_dir.join(award_artifact_name(year));
    write_json(&success_path, &successful, false)?;
    tracing::info!("successful responses saved to {}", success_path.display());

    let failure_path = if save_unsuccessful {
        let path = award_dir.join(unsuccessful_artifact_name(year));
        write_json(&path, &unsuccessful, true)?;
        tracing::info!("unsuccessful responses saved to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(AwardBatchReport {
        year,
        successful: successful.len(),
        unsuccessful: unsuccessful.len(),
        dropped,
        success_path,
        failure_path,
    })
}

/// Request one identifier's award record and classify the response.
pub async fn fetch_award(
    client: &HttpClient,
    config: &FetchConfig,
    uei: &str,
    year: i32,
) -> AwardOutcome {
    let url = award_url(&config.award_base_url, uei, year);
    match client.get(&url).await {
        Ok(resp) => classify_response(resp.status, &resp.body),
        Err(e) => AwardOutcome::Dropped {
            error: e.to_string(),
        },
    }
}

/// `<base>/<uei>/?year=<year>`
pub fn award_url(base: &str, uei: &str, year: i32) -> String {
    format!("{}/?year={year}", join_url(base, uei))
}

/// Only HTTP 200 with a JSON body counts as success.
pub fn classify_response(status: u16, body: &str) -> AwardOutcome {
    let parsed = serde_json::from_str::<Value>(body);
    match (status, parsed) {
        (200, Ok(payload)) => AwardOutcome::Success(payload),
        (_, Ok(body)) => AwardOutcome::Failure { status, body },
        (_, Err(_)) => AwardOutcome::Failure {
            status,
            body: Value::String(body.to_string()),
        },
    }
}

pub fn validate_year(year: i32) -> FetchResult<()> {
    let current = chrono::Utc::now().year();
    if !(MIN_AWARD_YEAR..=current).contains(&year) {
        return Err(FetchError::InvalidArgument(format!(
            "year must be between {MIN_AWARD_YEAR} and {current}, got {year}"
        )));
    }
    Ok(())
}
