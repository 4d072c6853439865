use bountyhub_core::config::BackendConfig;
use bountyhub_core::{BackendClient, BackendError, CampaignBackend, NewCampaign};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(id: &str, budget: serde_json::Value) -> serde_json::Value {
    json!({
        "_id": id,
        "title": "Based Fellowship",
        "description": "A program for developers building on Base",
        "creatorAddress": "0xCE54cF5a0dE3843011cF20389C1b6a4AaC442d6A",
        "tokenId": "22216",
        "link": "0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07",
        "isZora": false,
        "budgetPercentage": budget,
        "splitAddress": "0x39AcB1a082B059086e0D78372FC8B12DA118B9B8",
        "campaignStartDate": "2025-05-01T00:00:00.000Z",
        "campaignEndDate": "2025-05-11T00:00:00.000Z",
        "isFinalized": false,
        "keywords": ["base", "builders"],
        "createdAt": "2025-04-10T09:54:52.241Z",
        "updatedAt": "2025-05-16T10:54:52.241Z"
    })
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn new_campaign() -> NewCampaign {
    NewCampaign {
        title: "Based Fellowship".into(),
        description: "A program for developers building on Base".into(),
        creator_address: "0xCE54cF5a0dE3843011cF20389C1b6a4AaC442d6A".into(),
        token_id: Some("22216".into()),
        link: "0x2DD7f5527d1e234AB91EC9bBC6641eF169f95b07".into(),
        is_zora: false,
        split_address: "0x39AcB1a082B059086e0D78372FC8B12DA118B9B8".into(),
        budget_percentage: 20,
        campaign_start_date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        campaign_end_date: Utc.with_ymd_and_hms(2025, 5, 11, 0, 0, 0).unwrap(),
        keywords: vec!["base".into(), "builders".into()],
    }
}

#[tokio::test]
async fn test_list_all_accepts_string_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bounty/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([record("a1", json!("50")), record("a2", json!(30))])),
        )
        .mount(&server)
        .await;

    let campaigns = assert_ok!(client(&server).all().await);
    assert_eq!(campaigns.len(), 2);
    assert_eq!(campaigns[0].budget_percentage, 50);
    assert_eq!(campaigns[1].budget_percentage, 30);
    assert_eq!(campaigns[0].keywords, vec!["base", "builders"]);
}

#[tokio::test]
async fn test_by_id_not_found_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bounty/id/found"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record("found", json!(10))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bounty/id/null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bounty/id/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client(&server);
    let found = client.by_id("found").await.unwrap().unwrap();
    assert_eq!(found.id, "found");
    assert_eq!(client.by_id("null").await.unwrap(), None);
    assert_eq!(client.by_id("gone").await.unwrap(), None);
}

#[tokio::test]
async fn test_by_address() {
    let server = MockServer::start().await;
    let address = "0xCE54cF5a0dE3843011cF20389C1b6a4AaC442d6A";
    Mock::given(method("GET"))
        .and(path(format!("/bounty/address/{}", address)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("a1", json!(10))])))
        .mount(&server)
        .await;

    let campaigns = client(&server).by_address(address).await.unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].creator_address, address);
}

#[tokio::test]
async fn test_create_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create/bounty"))
        .and(body_partial_json(json!({
            "creatorAddress": "0xCE54cF5a0dE3843011cF20389C1b6a4AaC442d6A",
            "tokenId": "22216",
            "isZora": false,
            "budgetPercentage": 20,
            "keywords": ["base", "builders"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(record("new", json!(20))))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server).create(&new_campaign()).await.unwrap();
    assert_eq!(created.id, "new");
    assert_eq!(created.budget_percentage, 20);
}

#[tokio::test]
async fn test_create_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create/bounty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Bounty already exists"})))
        .mount(&server)
        .await;

    let err = client(&server).create(&new_campaign()).await.unwrap_err();
    assert_eq!(err, BackendError::Api("Bounty already exists".into()));
}

#[tokio::test]
async fn test_create_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create/bounty"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).create(&new_campaign()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 500,
            body: "database unavailable".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "API request failed with status 500: database unavailable"
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = BackendClient::new(&BackendConfig {
        url: "http://127.0.0.1:9".into(),
        timeout_secs: 2,
    })
    .unwrap();
    assert!(matches!(client.all().await, Err(BackendError::Network(_))));
}
