//! Integration tests for the SAM.gov entity snapshot.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use procurement_fetch::{
    fetch_entities, read_entity_identifiers, FetchConfig, FetchError, HttpClient,
};

fn config_for(server: &MockServer, dir: &tempfile::TempDir) -> FetchConfig {
    let mut cfg = FetchConfig::new(dir.path());
    cfg.entity_base_url = format!("{}/entity-information/v2/entities", server.uri());
    cfg
}

// ─────────────────────── fetch_entities ───────────────────────

#[tokio::test]
async fn test_entity_snapshot_saved() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&server, &dir);
    let client = HttpClient::new(&cfg).unwrap();

    Mock::given(method("GET"))
        .and(path("/entity-information/v2/entities"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("sbaBusinessTypeCode", "A6"))
        .and(query_param("registrationStatus", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalRecords": 1,
            "entityData": [{"entityRegistration": {"ueiSAM": "G1"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = fetch_entities(&client, &cfg, Some("test-key")).await.unwrap();
    assert_eq!(snapshot.total_records, Some(1));
    assert_eq!(snapshot.path, cfg.entity_snapshot_path());
    assert_eq!(
        read_entity_identifiers(&snapshot.path).unwrap(),
        vec!["G1".to_string()]
    );
}

#[tokio::test]
async fn test_entity_fetch_requires_api_key() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&server, &dir);
    let client = HttpClient::new(&cfg).unwrap();

    let err = fetch_entities(&client, &cfg, None).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_entity_fetch_error_status() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&server, &dir);
    let client = HttpClient::new(&cfg).unwrap();

    Mock::given(method("GET"))
        .and(path("/entity-information/v2/entities"))
        .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = fetch_entities(&client, &cfg, Some("k")).await.unwrap_err();
    assert!(matches!(err, FetchError::Remote { status: 403, .. }));
    assert!(!cfg.entity_snapshot_path().exists());
}
