use rental_scout::config::Config;
use rental_scout::fleet::{FleetClient, LandingPageContent};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FleetClient {
    let config = Config {
        api_base_url: server.uri(),
        fleet_key: Some("phoenix-fleet-2847".to_string()),
        ..Config::default()
    };
    FleetClient::new(&config).expect("client builds")
}

#[tokio::test]
async fn charge_host_sends_amount_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fleet/api/hosts/host-9/banking/charge"))
        .and(query_param("key", "phoenix-fleet-2847"))
        .and(body_json(json!({ "amount": 25.5, "reason": "Late return" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Charged $25.50"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .charge_host("host-9", 25.499, "Late return")
        .await
        .unwrap();
    assert_eq!(outcome.message.as_deref(), Some("Charged $25.50"));
}

#[tokio::test]
async fn invalid_amount_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).hold_funds("host-9", -10.0, "Damage").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unsuccessful_body_surfaces_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fleet/api/hosts/host-9/banking/payout"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "error": "Funds are on hold"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).force_payout("host-9").await.unwrap_err();
    assert!(err.to_string().contains("Funds are on hold"));
}

#[tokio::test]
async fn html_error_page_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fleet/api/hosts/host-9/banking/release"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_string("<html><body>Bad Gateway</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).release_hold("host-9").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("502"), "unexpected error: {message}");
    assert!(!message.contains("decode"));
}

#[tokio::test]
async fn approve_insurance_and_save_landing_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/fleet/insurance/prov-3/approve"))
        .and(query_param("key", "phoenix-fleet-2847"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/partner/landing/partner-1"))
        .and(body_json(json!({
            "headline": "Desert Drives",
            "subheadline": null,
            "about": "Family-run fleet",
            "heroImageUrl": null,
            "published": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Saved"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.approve_insurance("prov-3").await.unwrap().success);

    let content = LandingPageContent {
        headline: "Desert Drives".to_string(),
        about: Some("Family-run fleet".to_string()),
        published: true,
        ..LandingPageContent::default()
    };
    let outcome = client.save_landing_page("partner-1", &content).await.unwrap();
    assert_eq!(outcome.message.as_deref(), Some("Saved"));
}
