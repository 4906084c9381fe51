#![allow(clippy::unwrap_used)]
// Integration tests for the engine services against a mocked Meraki
// Dashboard API.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use airsync_core::{
    CoreError, CredentialVault, Credentials, Engine, EngineSettings, FlowStep, Integration,
    Network, NetworkRole, ProvisionRequest, ProvisioningFlow, ResourceSelection, SsidBinding,
    SsidMapping, Store, Vendor, VendorErrorCategory, VendorNetwork,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with_timeout(timeout: Duration) -> (MockServer, Engine, Uuid) {
    let server = MockServer::start().await;
    let settings = EngineSettings {
        vendor_timeout: timeout,
        concurrency: 4,
        meraki_base_url: server.uri(),
        ..EngineSettings::default()
    };
    let engine = Engine::new(
        Store::open_in_memory().unwrap(),
        CredentialVault::new([7u8; 32]),
        settings,
    );
    (server, engine, Uuid::new_v4())
}

async fn setup() -> (MockServer, Engine, Uuid) {
    setup_with_timeout(Duration::from_secs(5)).await
}

async fn mount_organizations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "O_1", "name": "Acme" }])),
        )
        .mount(server)
        .await;
}

async fn create_integration(server: &MockServer, engine: &Engine, ws: Uuid) -> Integration {
    mount_organizations(server).await;
    engine
        .integrations()
        .create(ws, Vendor::Meraki, "HQ", Credentials::from_api_key("test-key"))
        .await
        .unwrap()
}

fn vendor_network(id: &str, name: &str) -> VendorNetwork {
    VendorNetwork {
        id: id.into(),
        name: name.into(),
        product_types: vec!["wireless".into()],
        tags: Vec::new(),
        time_zone: None,
        raw: json!({ "id": id, "name": name }),
    }
}

fn guest_mapping(number: u8, name: &str) -> SsidMapping {
    let mut mapping = SsidMapping::new();
    mapping.assign(
        NetworkRole::GuestWifi,
        SsidBinding {
            ssid_number: number,
            ssid_name: name.into(),
            enabled: false,
        },
    );
    mapping
}

fn provision(
    engine: &Engine,
    ws: Uuid,
    integration: &Integration,
    networks: Vec<VendorNetwork>,
    tags: &[&str],
    mapping: Option<SsidMapping>,
) -> usize {
    engine
        .provisioner()
        .provision(ProvisionRequest {
            workspace_id: ws,
            vendor: Vendor::Meraki,
            integration_id: integration.id,
            organization_id: "O_1".into(),
            networks,
            tags: tags.iter().map(ToString::to_string).collect(),
            ssid_mapping: mapping,
        })
        .unwrap()
        .count
}

fn network_by_external(engine: &Engine, ws: Uuid, external_id: &str) -> Network {
    engine
        .store()
        .list_networks(ws)
        .unwrap()
        .into_iter()
        .find(|n| n.external_id == external_id)
        .unwrap()
}

fn guest_enabled(engine: &Engine, ws: Uuid, external_id: &str) -> bool {
    network_by_external(engine, ws, external_id)
        .ssid_mapping
        .guest_wifi()
        .unwrap()
        .enabled
}

fn ssid_body(number: u8, name: &str) -> serde_json::Value {
    json!({ "number": number, "name": name, "enabled": true, "authMode": "open" })
}

/// N_1 maps guest WiFi to SSID 2 "Guest"; N_2 has no mapping.
async fn scenario(server: &MockServer, engine: &Engine, ws: Uuid) -> (Network, Network) {
    let integration = create_integration(server, engine, ws).await;
    provision(
        engine,
        ws,
        &integration,
        vec![vendor_network("N_1", "Lobby")],
        &[],
        Some(guest_mapping(2, "Guest")),
    );
    provision(
        engine,
        ws,
        &integration,
        vec![vendor_network("N_2", "Warehouse")],
        &[],
        None,
    );
    (
        network_by_external(engine, ws, "N_1"),
        network_by_external(engine, ws, "N_2"),
    )
}

// ── Integrations ────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_integration_seals_credentials() {
    let (server, engine, ws) = setup().await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let integration = engine
        .integrations()
        .create(ws, Vendor::Meraki, "  HQ  ", Credentials::from_api_key("test-key"))
        .await
        .unwrap();

    assert_eq!(integration.name, "HQ");
    let stored = engine.integrations().get(ws, integration.id).unwrap();
    let sealed = stored.credentials.api_key.clone().unwrap();
    assert_ne!(sealed, "test-key");
    assert!(stored.credentials.access_token.is_none());

    let opened = engine.vault().open(&stored.credentials).unwrap();
    assert_eq!(opened.api_key.unwrap().expose_secret(), "test-key");
}

#[tokio::test]
async fn test_rejected_credentials_persist_nothing() {
    let (server, engine, ws) = setup().await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })),
        )
        .mount(&server)
        .await;

    let err = engine
        .integrations()
        .create(ws, Vendor::Meraki, "HQ", Credentials::from_api_key("bad"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Credential { .. }));
    assert!(engine.integrations().list(ws).unwrap().is_empty());
}

#[tokio::test]
async fn test_create_integration_input_validation() {
    let (_server, engine, ws) = setup().await;

    let blank = engine
        .integrations()
        .create(ws, Vendor::Meraki, " ", Credentials::from_api_key("k"))
        .await
        .unwrap_err();
    assert!(matches!(blank, CoreError::ValidationFailed { .. }));

    let no_secret = engine
        .integrations()
        .create(ws, Vendor::Meraki, "HQ", Credentials::default())
        .await
        .unwrap_err();
    assert!(matches!(no_secret, CoreError::ValidationFailed { .. }));

    let unavailable = engine
        .integrations()
        .create(ws, Vendor::Aruba, "HQ", Credentials::from_api_key("k"))
        .await
        .unwrap_err();
    assert!(matches!(unavailable, CoreError::VendorUnavailable { .. }));
}

#[tokio::test]
async fn test_delete_integration_cascades_to_its_networks_only() {
    let (server, engine, ws) = setup().await;
    let first = create_integration(&server, &engine, ws).await;
    let second = engine
        .integrations()
        .create(ws, Vendor::Meraki, "Branch", Credentials::from_api_key("k2"))
        .await
        .unwrap();

    provision(
        &engine,
        ws,
        &first,
        vec![vendor_network("N_1", "A"), vendor_network("N_2", "B")],
        &[],
        None,
    );
    provision(&engine, ws, &second, vec![vendor_network("N_3", "C")], &[], None);

    let removed = engine.integrations().delete(ws, first.id).unwrap();
    assert_eq!(removed, 2);

    let remaining = engine.store().list_networks(ws).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].integration_id, second.id);
    assert!(matches!(
        engine.integrations().get(ws, first.id),
        Err(CoreError::NotFound { .. })
    ));
}

// ── Provisioning ────────────────────────────────────────────────────

#[tokio::test]
async fn test_reprovisioning_updates_instead_of_duplicating() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    let first = provision(
        &engine,
        ws,
        &integration,
        vec![vendor_network("N_1", "Lobby")],
        &["old"],
        None,
    );
    let second = provision(
        &engine,
        ws,
        &integration,
        vec![vendor_network("N_1", "Lobby (renamed)")],
        &["new", "new", "cafe"],
        Some(guest_mapping(3, "Visitors")),
    );
    assert_eq!((first, second), (1, 1));

    let networks = engine.store().list_networks(ws).unwrap();
    assert_eq!(networks.len(), 1);
    let network = &networks[0];
    assert_eq!(network.name, "Lobby (renamed)");
    assert_eq!(network.tags, vec!["cafe".to_string(), "new".to_string()]);
    assert_eq!(network.ssid_mapping.guest_wifi().unwrap().ssid_number, 3);
    assert_eq!(network.vendor_snapshot.organization_id.as_deref(), Some("O_1"));
    assert_eq!(network.status, airsync_core::ProvisioningStatus::Active);
}

#[tokio::test]
async fn test_provision_applies_mapping_to_every_network() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    let count = provision(
        &engine,
        ws,
        &integration,
        vec![
            vendor_network("N_1", "A"),
            vendor_network("N_2", "B"),
            vendor_network("N_1", "A"),
        ],
        &[],
        Some(guest_mapping(2, "Guest")),
    );
    assert_eq!(count, 2);

    for network in engine.store().list_networks(ws).unwrap() {
        assert_eq!(network.ssid_mapping, guest_mapping(2, "Guest"));
    }
}

#[tokio::test]
async fn test_provision_validates_scope() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    let request = ProvisionRequest {
        workspace_id: ws,
        vendor: Vendor::Meraki,
        integration_id: integration.id,
        organization_id: "O_1".into(),
        networks: vec![vendor_network("N_1", "A")],
        tags: Vec::new(),
        ssid_mapping: None,
    };

    let empty = ProvisionRequest {
        networks: Vec::new(),
        ..request.clone()
    };
    assert!(matches!(
        engine.provisioner().provision(empty),
        Err(CoreError::ValidationFailed { .. })
    ));

    let other_workspace = ProvisionRequest {
        workspace_id: Uuid::new_v4(),
        ..request.clone()
    };
    assert!(matches!(
        engine.provisioner().provision(other_workspace),
        Err(CoreError::NotFound { .. })
    ));

    let wrong_vendor = ProvisionRequest {
        vendor: Vendor::Unifi,
        ..request
    };
    assert!(matches!(
        engine.provisioner().provision(wrong_vendor),
        Err(CoreError::ValidationFailed { .. })
    ));
    assert!(engine.store().list_networks(ws).unwrap().is_empty());
}

// ── Deploy ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_deploy_skips_unassigned_network() {
    let (server, engine, ws) = setup().await;
    let (n1, n2) = scenario(&server, &engine, ws).await;

    Mock::given(method("PUT"))
        .and(path("/networks/N_1/wireless/ssids/2"))
        .and(body_json(json!({
            "enabled": true,
            "authMode": "open",
            "splashPage": "Click-through splash page"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Guest")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/networks/N_2/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = engine.reconciler().deploy(ws, &[n1.id, n2.id]).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
    assert!(guest_enabled(&engine, ws, "N_1"));
    assert!(
        network_by_external(&engine, ws, "N_2")
            .ssid_mapping
            .guest_wifi()
            .is_none()
    );
}

#[tokio::test]
async fn test_deploy_isolates_failing_network() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;
    provision(
        &engine,
        ws,
        &integration,
        vec![vendor_network("N_A", "Alpha"), vendor_network("N_B", "Bravo")],
        &[],
        Some(guest_mapping(2, "Guest")),
    );

    Mock::given(method("PUT"))
        .and(path("/networks/N_A/wireless/ssids/2"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "errors": ["Internal failure"] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/networks/N_B/wireless/ssids/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Guest")))
        .mount(&server)
        .await;

    let ids: Vec<Uuid> = engine
        .store()
        .list_networks(ws)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    let report = engine.reconciler().deploy(ws, &ids).await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.is_partial());
    let failure = &report.errors[0];
    assert_eq!(failure.network_name, "Alpha");
    assert_eq!(failure.category, Some(VendorErrorCategory::Server));
    assert!(failure.error.contains("Internal failure"));

    assert!(!guest_enabled(&engine, ws, "N_A"));
    assert!(guest_enabled(&engine, ws, "N_B"));
}

#[tokio::test]
async fn test_deploy_timeout_leaves_local_state_unchanged() {
    let (server, engine, ws) = setup_with_timeout(Duration::from_millis(200)).await;
    let (n1, n2) = scenario(&server, &engine, ws).await;

    Mock::given(method("PUT"))
        .and(path("/networks/N_1/wireless/ssids/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ssid_body(2, "Guest"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let report = engine.reconciler().deploy(ws, &[n1.id, n2.id]).await.unwrap();

    assert_eq!(report.updated, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.is_total_failure());
    assert_eq!(report.errors[0].network_name, "Lobby");
    assert_eq!(report.errors[0].category, Some(VendorErrorCategory::Timeout));
    assert!(report.errors[0].error.contains("timeout"));
    assert!(!guest_enabled(&engine, ws, "N_1"));
}

#[tokio::test]
async fn test_deploy_unknown_network_fails_before_vendor_call() {
    let (server, engine, ws) = setup().await;
    let (n1, _) = scenario(&server, &engine, ws).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = engine
        .reconciler()
        .deploy(ws, &[n1.id, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    // Another workspace can't reach this network either.
    let err = engine
        .reconciler()
        .deploy(Uuid::new_v4(), &[n1.id])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_deploy_is_idempotent() {
    let (server, engine, ws) = setup().await;
    let (n1, _) = scenario(&server, &engine, ws).await;

    Mock::given(method("PUT"))
        .and(path("/networks/N_1/wireless/ssids/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Guest")))
        .expect(2)
        .mount(&server)
        .await;

    let first = engine.reconciler().deploy(ws, &[n1.id]).await.unwrap();
    let second = engine.reconciler().deploy(ws, &[n1.id, n1.id]).await.unwrap();
    assert_eq!(first, second);
    assert!(guest_enabled(&engine, ws, "N_1"));
}

// ── Rename ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rename_is_idempotent() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;
    provision(
        &engine,
        ws,
        &integration,
        vec![vendor_network("N_1", "A"), vendor_network("N_2", "B")],
        &[],
        Some(guest_mapping(2, "Guest")),
    );
    provision(&engine, ws, &integration, vec![vendor_network("N_3", "C")], &[], None);

    Mock::given(method("PUT"))
        .and(path_regex(r"^/networks/N_[12]/wireless/ssids/2$"))
        .and(body_json(json!({ "name": "Visitors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Visitors")))
        .expect(4)
        .mount(&server)
        .await;

    let first = engine.reconciler().rename(ws, "Visitors").await.unwrap();
    let state_after_first = engine.store().list_networks(ws).unwrap();
    let second = engine.reconciler().rename(ws, " Visitors ").await.unwrap();

    assert_eq!(first.updated, 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first, second);

    let state_after_second = engine.store().list_networks(ws).unwrap();
    let mappings =
        |networks: &[Network]| networks.iter().map(|n| n.ssid_mapping.clone()).collect::<Vec<_>>();
    assert_eq!(mappings(&state_after_first), mappings(&state_after_second));
    assert_eq!(
        network_by_external(&engine, ws, "N_1")
            .ssid_mapping
            .guest_wifi()
            .unwrap()
            .ssid_name,
        "Visitors"
    );
}

#[tokio::test]
async fn test_rename_isolates_rate_limited_network() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;
    provision(
        &engine,
        ws,
        &integration,
        vec![vendor_network("N_A", "Alpha"), vendor_network("N_B", "Bravo")],
        &[],
        Some(guest_mapping(2, "Guest")),
    );

    Mock::given(method("PUT"))
        .and(path("/networks/N_A/wireless/ssids/2"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/networks/N_B/wireless/ssids/2"))
        .and(body_json(json!({ "name": "Visitors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Visitors")))
        .mount(&server)
        .await;

    let report = engine.reconciler().rename(ws, "Visitors").await.unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.is_partial());
    let failure = &report.errors[0];
    assert_eq!(failure.network_name, "Alpha");
    assert_eq!(failure.category, Some(VendorErrorCategory::RateLimited));
    assert!(failure.error.contains("7s"));

    let guest_name = |external_id: &str| {
        network_by_external(&engine, ws, external_id)
            .ssid_mapping
            .guest_wifi()
            .unwrap()
            .ssid_name
            .clone()
    };
    assert_eq!(guest_name("N_A"), "Guest");
    assert_eq!(guest_name("N_B"), "Visitors");
}

#[tokio::test]
async fn test_rename_rejects_empty_name() {
    let (_server, engine, ws) = setup().await;
    let err = engine.reconciler().rename(ws, "   ").await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_guest_wifi_status_counts() {
    let (server, engine, ws) = setup().await;
    let (n1, _) = scenario(&server, &engine, ws).await;

    let before = engine.reconciler().guest_wifi_status(ws).unwrap();
    assert_eq!((before.networks, before.mapped, before.enabled), (2, 1, 0));

    Mock::given(method("PUT"))
        .and(path("/networks/N_1/wireless/ssids/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ssid_body(2, "Guest")))
        .mount(&server)
        .await;
    engine.reconciler().deploy(ws, &[n1.id]).await.unwrap();

    let after = engine.reconciler().guest_wifi_status(ws).unwrap();
    assert_eq!((after.networks, after.mapped, after.enabled), (2, 1, 1));
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovery_filters_and_aggregates() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    Mock::given(method("GET"))
        .and(path("/organizations/O_1/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "N_1", "name": "Lobby", "productTypes": ["appliance", "wireless"] },
            { "id": "N_2", "name": "Cameras", "productTypes": ["camera"] }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/O_1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "serial": "Q1", "tags": ["lobby", "floor-1"] },
            { "serial": "Q2", "tags": ["floor-1", "cafe"] },
            { "serial": "Q3" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/networks/N_1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "serial": "Q1" }, { "serial": "Q2" }
        ])))
        .mount(&server)
        .await;

    let discovery = engine.discovery();
    let orgs = discovery.organizations(ws, integration.id).await.unwrap();
    assert_eq!(orgs[0].name, "Acme");

    let networks = discovery.networks(ws, integration.id, "O_1").await.unwrap();
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].id, "N_1");

    let tags = discovery.device_tags(ws, integration.id, "O_1").await.unwrap();
    assert_eq!(tags, vec!["cafe", "floor-1", "lobby"]);

    assert_eq!(discovery.device_count(ws, integration.id, "N_1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_discovery_propagates_vendor_errors() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    Mock::given(method("GET"))
        .and(path("/organizations/O_404/networks"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "errors": ["Not found"] })),
        )
        .mount(&server)
        .await;

    let err = engine
        .discovery()
        .networks(ws, integration.id, "O_404")
        .await
        .unwrap_err();
    assert_eq!(err.vendor_category(), Some(VendorErrorCategory::NotFound));

    let err = engine
        .discovery()
        .organizations(Uuid::new_v4(), integration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_ssid_consistency_check() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    let ssids = |guest: &str| {
        json!([
            { "number": 0, "name": "Corp", "enabled": true },
            { "number": 2, "name": guest, "enabled": false }
        ])
    };
    for (network, guest) in [("N_1", "Guest"), ("N_2", "Guest"), ("N_3", "Visitors")] {
        Mock::given(method("GET"))
            .and(path(format!("/networks/{network}/wireless/ssids")))
            .respond_with(ResponseTemplate::new(200).set_body_json(ssids(guest)))
            .mount(&server)
            .await;
    }

    let ids: Vec<String> = ["N_1", "N_2", "N_3"].iter().map(ToString::to_string).collect();
    let mismatches = engine
        .discovery()
        .check_ssid_consistency(ws, integration.id, &ids)
        .await
        .unwrap();

    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].network_id, "N_3");
    assert_eq!(mismatches[0].reference_network_id, "N_1");
    assert_eq!(mismatches[0].differing_numbers, vec![2]);
}

// ── Provisioning flow ───────────────────────────────────────────────

#[tokio::test]
async fn test_flow_end_to_end_with_back_navigation() {
    let (server, engine, ws) = setup().await;
    mount_organizations(&server).await;
    Mock::given(method("GET"))
        .and(path("/networks/N_1/wireless/ssids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 0, "name": "Corp", "enabled": true },
            { "number": 2, "name": "Guest", "enabled": false }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut flow = ProvisioningFlow::start(ws, Vendor::Meraki).unwrap();
    flow.authenticate(&engine, "HQ", Credentials::from_api_key("k"))
        .await
        .unwrap();
    assert_eq!(flow.step(), FlowStep::Authenticated);

    let selection = ResourceSelection {
        organization_id: "O_1".into(),
        networks: vec![vendor_network("N_1", "Lobby"), vendor_network("N_2", "Cafe")],
        tags: vec!["floor-1".into()],
    };
    flow.select_resources(selection.clone()).unwrap();
    assert_eq!(flow.back().unwrap(), FlowStep::Authenticated);
    assert!(flow.selection().is_none());
    flow.select_resources(selection).unwrap();

    assert_eq!(flow.mapping_source_network().unwrap().id, "N_1");
    let candidates = flow.mapping_candidates(&engine).await.unwrap();
    let mapping =
        SsidMapping::from_assignments(&[(NetworkRole::GuestWifi, 2)], &candidates).unwrap();
    flow.map_ssids(mapping).unwrap();
    assert_eq!(flow.step(), FlowStep::SsidMapped);

    let outcome = flow.provision(&engine).unwrap();
    assert_eq!(outcome.count, 2);
    assert_eq!(flow.step(), FlowStep::Provisioned);
    assert!(matches!(flow.back(), Err(CoreError::InvalidTransition { .. })));

    let networks = engine.store().list_networks(ws).unwrap();
    assert_eq!(networks.len(), 2);
    for network in networks {
        assert_eq!(network.tags, vec!["floor-1".to_string()]);
        assert_eq!(network.ssid_mapping.guest_wifi().unwrap().ssid_name, "Guest");
    }
}

#[tokio::test]
async fn test_flow_skip_mapping_and_existing_integration() {
    let (server, engine, ws) = setup().await;
    let integration = create_integration(&server, &engine, ws).await;

    let mut flow = ProvisioningFlow::start(ws, Vendor::Meraki).unwrap();
    assert!(matches!(
        flow.provision(&engine),
        Err(CoreError::InvalidTransition { .. })
    ));
    assert!(matches!(
        flow.use_existing_integration(&engine, Uuid::new_v4()),
        Err(CoreError::NotFound { .. })
    ));

    flow.use_existing_integration(&engine, integration.id).unwrap();
    let empty = ResourceSelection {
        organization_id: "O_1".into(),
        networks: Vec::new(),
        tags: Vec::new(),
    };
    assert!(matches!(
        flow.select_resources(empty),
        Err(CoreError::ValidationFailed { .. })
    ));
    assert_eq!(flow.step(), FlowStep::Authenticated);

    flow.select_resources(ResourceSelection {
        organization_id: "O_1".into(),
        networks: vec![vendor_network("N_1", "Lobby")],
        tags: Vec::new(),
    })
    .unwrap();
    flow.skip_mapping().unwrap();
    assert_eq!(flow.provision(&engine).unwrap().count, 1);

    let network = network_by_external(&engine, ws, "N_1");
    assert!(network.ssid_mapping.is_empty());
}

#[tokio::test]
async fn test_flow_failed_authentication_stays_put() {
    let (server, engine, ws) = setup().await;
    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut flow = ProvisioningFlow::start(ws, Vendor::Meraki).unwrap();
    let err = flow
        .authenticate(&engine, "HQ", Credentials::from_api_key("bad"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Credential { .. }));
    assert_eq!(flow.step(), FlowStep::VendorSelected);
    assert!(flow.integration().is_none());
    assert!(engine.integrations().list(ws).unwrap().is_empty());
}
