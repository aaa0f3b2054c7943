//! Payment function envelopes.

#![allow(clippy::unwrap_used)]

use bread_client::services::payments::{
    PaymentIntentRequest, SavePaymentMethodRequest, SetupIntentRequest,
};
use bread_client::{AppContext, ClientConfig};
use bread_core::{CurrencyCode, Email};
use bread_integration_tests::{ANON_KEY, config_for, context_for};
use httpmock::prelude::*;
use serde_json::json;
use url::Url;

fn setup_request() -> SetupIntentRequest {
    SetupIntentRequest {
        email: Email::parse("buyer@bread.io").unwrap(),
        name: Some("Buyer".to_string()),
        user_id: None,
    }
}

#[tokio::test]
async fn test_setup_intent_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/functions/v1/create-setup-intent")
                .header("authorization", format!("Bearer {ANON_KEY}"));
            then.status(200).json_body(json!({
                "clientSecret": "seti_123_secret_abc",
                "customerId": "cus_123"
            }));
        })
        .await;
    let (ctx, _) = context_for(&server);

    let response = ctx.payments().create_setup_intent(&setup_request()).await;

    mock.assert_async().await;
    assert!(response.success);
    assert!(response.error.is_none());
    let intent = response.into_result().unwrap();
    assert_eq!(intent.client_secret, "seti_123_secret_abc");
    assert_eq!(intent.customer_id, "cus_123");
}

#[tokio::test]
async fn test_function_error_becomes_fixed_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/functions/v1/save-payment-method");
            then.status(400)
                .json_body(json!({ "error": "No such PaymentMethod: 'pm_bad'" }));
        })
        .await;
    let (ctx, _) = context_for(&server);

    let response = ctx
        .payments()
        .save_payment_method(&SavePaymentMethodRequest {
            customer_id: "cus_123".to_string(),
            payment_method_id: "pm_bad".to_string(),
            user_id: None,
        })
        .await;

    assert!(!response.success);
    assert!(response.payload.is_none());
    assert_eq!(
        response.error.as_deref(),
        Some("Failed to save payment method")
    );
}

/// A context whose functions host refuses connections.
fn unreachable_context() -> AppContext {
    // Bind then release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let config = ClientConfig::new(base, ANON_KEY.to_string().into()).unwrap();
    AppContext::with_identity_store(
        config,
        std::sync::Arc::new(bread_client::storage::MemoryIdentityStore::default()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_payment_intent_unreachable_host() {
    let ctx = unreachable_context();

    let response = ctx
        .payments()
        .create_payment_intent(&PaymentIntentRequest {
            amount: 8000,
            currency: CurrencyCode::default(),
            auction_id: "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d".parse().unwrap(),
            customer_id: None,
            payment_method_id: None,
        })
        .await;

    assert!(!response.success);
    assert_eq!(
        response.into_result().unwrap_err(),
        "Failed to create payment intent"
    );
}

#[tokio::test]
async fn test_setup_intent_unreachable_host() {
    let ctx = unreachable_context();

    let response = ctx.payments().create_setup_intent(&setup_request()).await;

    assert!(!response.success);
    assert!(response.payload.is_none());
    assert_eq!(response.error.as_deref(), Some("Failed to create setup intent"));
}

#[tokio::test]
async fn test_save_payment_method_unreachable_host() {
    let ctx = unreachable_context();

    let response = ctx
        .payments()
        .save_payment_method(&SavePaymentMethodRequest {
            customer_id: "cus_123".to_string(),
            payment_method_id: "pm_123".to_string(),
            user_id: None,
        })
        .await;

    assert!(!response.success);
    assert_eq!(
        response.into_result().unwrap_err(),
        "Failed to save payment method"
    );
}

#[tokio::test]
async fn test_functions_url_override() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/edge/create-setup-intent");
            then.status(200).json_body(json!({
                "clientSecret": "seti_456_secret",
                "customerId": "cus_456",
                "setupIntentId": "seti_456"
            }));
        })
        .await;
    let config = config_for(&server).with_functions_url(Url::parse(&server.url("/edge")).unwrap());
    let ctx = AppContext::with_identity_store(
        config,
        std::sync::Arc::new(bread_client::storage::MemoryIdentityStore::default()),
    )
    .unwrap();

    let intent = ctx
        .payments()
        .create_setup_intent(&setup_request())
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(intent.setup_intent_id.as_deref(), Some("seti_456"));
}
