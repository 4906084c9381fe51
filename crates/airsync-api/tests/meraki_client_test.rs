#![allow(clippy::unwrap_used)]
// Integration tests for `MerakiClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use airsync_api::meraki::types::SsidUpdate;
use airsync_api::{Error, MerakiClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MerakiClient) {
    setup_with_timeout(Duration::from_secs(5)).await
}

async fn setup_with_timeout(timeout: Duration) -> (MockServer, MerakiClient) {
    let server = MockServer::start().await;
    let token = SecretString::from("test-api-key".to_string());
    let client = MerakiClient::from_token(
        &format!("{}/api/v1", server.uri()),
        &token,
        &TransportConfig::with_timeout(timeout),
    )
    .unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_organizations_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .and(header("authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "549236", "name": "Acme Corp", "url": "https://n1.meraki.com/o/x" },
            { "id": "549237", "name": "Acme Labs" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let orgs = client.list_organizations().await.unwrap();

    assert_eq!(orgs.len(), 2);
    assert_eq!(orgs[0].id, "549236");
    assert_eq!(orgs[1].name, "Acme Labs");
    assert!(orgs[1].url.is_none());
}

#[tokio::test]
async fn test_list_networks_keeps_unknown_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/549236/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "L_100",
                "organizationId": "549236",
                "name": "HQ",
                "productTypes": ["appliance", "wireless"],
                "tags": ["hq"],
                "timeZone": "Europe/Berlin",
                "notes": "main office"
            },
            { "id": "L_200", "name": "Cameras", "productTypes": ["camera"] }
        ])))
        .mount(&server)
        .await;

    let networks = client.list_organization_networks("549236").await.unwrap();

    assert_eq!(networks.len(), 2);
    assert!(networks[0].is_wireless());
    assert!(!networks[1].is_wireless());
    assert_eq!(networks[0].extra.get("notes"), Some(&json!("main office")));
    assert!(networks[1].tags.is_empty());
}

#[tokio::test]
async fn test_list_ssids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/L_100/wireless/ssids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 0, "name": "Corp", "enabled": true, "authMode": "psk" },
            {
                "number": 2,
                "name": "Guest",
                "enabled": false,
                "authMode": "open",
                "splashPage": "None",
                "defaultVlanId": 30,
                "bandSelection": "Dual band operation"
            }
        ])))
        .mount(&server)
        .await;

    let ssids = client.list_network_ssids("L_100").await.unwrap();

    assert_eq!(ssids.len(), 2);
    assert_eq!(ssids[1].number, 2);
    assert!(!ssids[1].enabled);
    assert_eq!(ssids[1].default_vlan_id, Some(30));
    assert_eq!(ssids[0].auth_mode.as_deref(), Some("psk"));
    assert!(ssids[1].extra.contains_key("bandSelection"));
}

#[tokio::test]
async fn test_update_ssid_sends_only_present_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/networks/L_100/wireless/ssids/2"))
        .and(body_json(json!({ "name": "Visitors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 2, "name": "Visitors", "enabled": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = SsidUpdate {
        name: Some("Visitors".into()),
        ..SsidUpdate::default()
    };
    let ssid = client.update_network_ssid("L_100", 2, &update).await.unwrap();

    assert_eq!(ssid.name, "Visitors");
}

#[tokio::test]
async fn test_list_organization_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/549236/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "serial": "Q2XX-AAAA-0001", "name": "AP lobby", "tags": ["lobby", "floor-1"] },
            { "serial": "Q2XX-AAAA-0002" }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_organization_devices("549236").await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].tags, vec!["lobby", "floor-1"]);
    assert!(devices[1].tags.is_empty());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_carries_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })),
        )
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();

    assert!(err.is_unauthorized(), "expected unauthorized, got: {err:?}");
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_with_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/L_404/wireless/ssids"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let err = client.list_network_ssids("L_404").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();

    assert!(
        matches!(err, Error::RateLimited { retry_after_secs: 7 }),
        "expected RateLimited, got: {err:?}"
    );
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let (server, client) = setup_with_timeout(Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();

    assert!(
        matches!(err, Error::Timeout { timeout } if timeout == Duration::from_millis(200)),
        "expected Timeout, got: {err:?}"
    );
    assert_eq!(err.to_string(), "Request timed out after 200ms");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }));
}
