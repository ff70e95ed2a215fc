//! Gateway client tests against a stubbed Chapa API.

use rust_decimal_macros::dec;
use secrecy::Secret;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use travel_service::config::ChapaConfig;
use travel_service::error::AppError;
use travel_service::models::PaymentStatus;
use travel_service::services::chapa::{ChapaClient, Customization, InitializeRequest};

fn test_config(base_url: &str) -> ChapaConfig {
    ChapaConfig {
        secret_key: Secret::new("test-secret".to_string()),
        api_base_url: base_url.to_string(),
        timeout_seconds: 5,
    }
}

fn initialize_request() -> InitializeRequest {
    InitializeRequest {
        amount: dec!(120.00),
        currency: "ETB".to_string(),
        email: "jane@x.com".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone_number: "".to_string(),
        tx_ref: "booking_7_Jane_Doe".to_string(),
        callback_url: "http://localhost:3006/payments/verify/".to_string(),
        return_url: "http://localhost:3006/payments/success/".to_string(),
        customization: Customization {
            title: "Travel Booking Payment".to_string(),
            description: "Payment for booking: Lakeside Villa".to_string(),
        },
    }
}

#[tokio::test]
async fn initialize_returns_checkout_url_and_tx_ref() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(header("Authorization", "Bearer test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "message": "Hosted Link",
            "data": {
                "checkout_url": "https://pay/x",
                "tx_ref": "abc123"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChapaClient::new(test_config(&server.uri())).unwrap();
    let data = client
        .initialize(&initialize_request())
        .await
        .expect("initialize should succeed");

    assert_eq!(data.checkout_url, "https://pay/x");
    assert_eq!(data.tx_ref.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn initialize_non_success_surfaces_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "failed",
            "message": "Invalid currency"
        })))
        .mount(&server)
        .await;

    let client = ChapaClient::new(test_config(&server.uri())).unwrap();
    let err = client
        .initialize(&initialize_request())
        .await
        .expect_err("initialize should fail");

    match err {
        AppError::Gateway(msg) => {
            assert!(msg.contains("400"));
            assert!(msg.contains("Invalid currency"));
        }
        other => panic!("expected Gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn initialize_transport_failure_surfaces_gateway_error() {
    // Nothing listens on this port.
    let client = ChapaClient::new(test_config("http://127.0.0.1:1")).unwrap();

    let err = client
        .initialize(&initialize_request())
        .await
        .expect_err("initialize should fail");

    assert!(matches!(err, AppError::Gateway(_)));
}

#[tokio::test]
async fn verify_returns_lowercased_remote_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/abc123"))
        .and(header("Authorization", "Bearer test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS",
            "message": "Payment details",
            "data": { "status": "success", "amount": "120.00" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChapaClient::new(test_config(&server.uri())).unwrap();
    let outcome = client.verify("abc123").await.expect("verify should succeed");

    assert_eq!(outcome.remote_status, "success");
}

#[tokio::test]
async fn verify_without_remote_status_maps_to_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/tx2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Payment details",
            "data": { "amount": "120.00" }
        })))
        .mount(&server)
        .await;

    let client = ChapaClient::new(test_config(&server.uri())).unwrap();
    let outcome = client.verify("tx2").await.expect("verify should succeed");

    assert_eq!(outcome.remote_status, "");
    assert_eq!(
        PaymentStatus::from_remote(&outcome.remote_status),
        PaymentStatus::Failed
    );
}

#[tokio::test]
async fn verify_non_success_surfaces_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": "failed",
            "message": "Transaction not found"
        })))
        .mount(&server)
        .await;

    let client = ChapaClient::new(test_config(&server.uri())).unwrap();
    let err = client
        .verify("missing")
        .await
        .expect_err("verify should fail");

    assert!(matches!(err, AppError::Gateway(_)));
}

#[tokio::test]
async fn verify_round_trips_through_status_mapping() {
    let cases = [
        ("success", PaymentStatus::Completed),
        ("pending", PaymentStatus::Pending),
        ("failed", PaymentStatus::Failed),
        ("refunded", PaymentStatus::Failed),
    ];

    for (remote, expected) in cases {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/transaction/verify/tx1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": remote,
                "message": null,
                "data": null
            })))
            .mount(&server)
            .await;

        let client = ChapaClient::new(test_config(&server.uri())).unwrap();
        let outcome = client.verify("tx1").await.expect("verify should succeed");

        assert_eq!(PaymentStatus::from_remote(&outcome.remote_status), expected);
    }
}
