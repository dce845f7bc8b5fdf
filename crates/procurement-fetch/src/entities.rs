//! SAM.gov entity snapshot and identifier list readers.
//!
//! These produce the UEI collections consumed by the batch fetchers.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::artifacts::write_atomic;
use crate::config::FetchConfig;
use crate::http::HttpClient;
use crate::types::{EntitySnapshot, FetchError, FetchResult};

/// SBA business type code for 8(a)-certified firms.
pub const SBA_8A_TYPE_CODE: &str = "A6";

/// Registration status for active entities.
pub const ACTIVE_REGISTRATION: &str = "A";

/// Query SAM.gov for active 8(a) firms and save the raw response.
pub async fn fetch_entities(
    client: &HttpClient,
    config: &FetchConfig,
    api_key: Option<&str>,
) -> FetchResult<EntitySnapshot> {
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| FetchError::InvalidArgument("a SAM.gov API key is required".into()))?;

    tracing::info!(
        "querying SAM.gov: sbaBusinessTypeCode={SBA_8A_TYPE_CODE}, registrationStatus={ACTIVE_REGISTRATION}"
    );

    let resp = client
        .get_with_query(
            &config.entity_base_url,
            &[
                ("api_key", api_key),
                ("sbaBusinessTypeCode", SBA_8A_TYPE_CODE),
                ("registrationStatus", ACTIVE_REGISTRATION),
            ],
        )
        .await?;

    if resp.status != 200 {
        tracing::warn!("SAM.gov returned HTTP {}: {}", resp.status, resp.body);
        return Err(FetchError::Remote {
            status: resp.status,
            url: resp.url,
        });
    }

    let data: Value = serde_json::from_str(&resp.body)?;
    let total_records = data.get("totalRecords").and_then(Value::as_u64);
    match total_records {
        Some(n) => tracing::info!("retrieved {n} records"),
        None => tracing::warn!("response has no totalRecords field"),
    }

    let path = config.entity_snapshot_path();
    write_atomic(&path, resp.body.as_bytes())?;
    tracing::info!("entity data saved to {}", path.display());

    Ok(EntitySnapshot {
        total_records,
        path,
    })
}

/// UEIs from a saved SAM snapshot, in order, without duplicates.
pub fn read_entity_identifiers(path: &Path) -> FetchResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&text)?;
    identifiers_from_snapshot(&data)
}

fn identifiers_from_snapshot(data: &Value) -> FetchResult<Vec<String>> {
    let entities = data
        .get("entityData")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Parse("snapshot has no entityData array".into()))?;

    let mut seen = HashSet::new();
    let ueis = entities
        .iter()
        .filter_map(|e| e.pointer("/entityRegistration/ueiSAM"))
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty() && seen.insert(u.to_string()))
        .map(str::to_string)
        .collect();
    Ok(ueis)
}

/// Identifiers from a text file, one per line; `#` starts a comment.
pub fn read_identifier_list(path: &Path) -> FetchResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_identifier_list(&text))
}

fn parse_identifier_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifiers_from_snapshot() {
        let data = json!({
            "totalRecords": 3,
            "entityData": [
                {"entityRegistration": {"ueiSAM": "ABC123", "legalBusinessName": "Acme"}},
                {"entityRegistration": {"legalBusinessName": "No UEI"}},
                {"entityRegistration": {"ueiSAM": "XYZ789"}},
                {"entityRegistration": {"ueiSAM": "ABC123"}}
            ]
        });
        assert_eq!(identifiers_from_snapshot(&data).unwrap(), vec!["ABC123", "XYZ789"]);
    }

    #[test]
    fn test_snapshot_without_entity_data() {
        let err = identifiers_from_snapshot(&json!({"totalRecords": 0})).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_parse_identifier_list() {
        let text = "# firms\nA1\n\n  A2  \nA3 # flagged\n";
        assert_eq!(parse_identifier_list(text), vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn test_read_entity_identifiers_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sam_data.json");
        std::fs::write(
            &path,
            r#"{"entityData":[{"entityRegistration":{"ueiSAM":"Q1"}}]}"#,
        )
        .unwrap();
        assert_eq!(read_entity_identifiers(&path).unwrap(), vec!["Q1"]);
    }
}
