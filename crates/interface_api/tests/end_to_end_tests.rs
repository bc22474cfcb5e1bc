//! End-to-end tests
//!
//! HTTP request -> router -> dispatcher -> chat gateway -> mock upstream.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use core_kernel::{TenantId, UserId};
use domain_actions::{ActionCatalog, ActionDispatcher};
use infra_gateway::{ChatGateway, GatewayConfig};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::create_router;
use test_utils::{assert_failure_envelope, assert_success_envelope, TestActionRequestBuilder};

fn completion_body(content: &str) -> Value {
    json!({
        "model": "test-model",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 40, "completion_tokens": 20, "total_tokens": 60}
    })
}

fn server_for(upstream: &MockServer) -> (TestServer, TenantId, String) {
    let gateway = ChatGateway::new(
        GatewayConfig::new(upstream.uri(), "test-key")
            .model("test-model")
            .max_retries(1)
            .retry_delay_ms(1)
            .circuit_breaker(None),
    )
    .unwrap();

    let config = ApiConfig::default();
    let tenant = TenantId::new();
    let token = create_token(&UserId::new(), &tenant, vec![], &config.jwt_secret, 300).unwrap();

    let dispatcher = ActionDispatcher::new(ActionCatalog::standard(), Arc::new(gateway));
    let server = TestServer::new(create_router(dispatcher, config)).unwrap();
    (server, tenant, token)
}

#[tokio::test]
async fn test_fenced_reply_is_extracted() {
    let upstream = MockServer::start().await;
    let (server, tenant, token) = server_for(&upstream);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "test-model", "user": tenant.to_string() })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Here is the profile:\n```json\n{\"summary\": \"Stable\", \"sector\": \"Manufacturing\"}\n```",
        )))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = server
        .post("/functions/v1/company-intelligence")
        .authorization_bearer(token)
        .json(&TestActionRequestBuilder::analyze_company().body())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_success_envelope(&body, "analyze_company");
    assert_eq!(body["data"]["summary"], "Stable");
}

#[tokio::test]
async fn test_upstream_rate_limit_reaches_client() {
    let upstream = MockServer::start().await;
    let (server, _, token) = server_for(&upstream);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = server
        .post("/functions/v1/company-intelligence")
        .authorization_bearer(token)
        .json(&TestActionRequestBuilder::analyze_company().body())
        .await;

    assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "7");
}

#[tokio::test]
async fn test_upstream_outage_is_internal_error() {
    let upstream = MockServer::start().await;
    let (server, _, token) = server_for(&upstream);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let response = server
        .post("/functions/v1/company-intelligence")
        .authorization_bearer(token)
        .json(&TestActionRequestBuilder::analyze_company().body())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_failure_envelope(&response.json::<Value>(), "Internal server error");
}

#[tokio::test]
async fn test_client_error_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    let (server, _, token) = server_for(&upstream);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(0)
        .mount(&upstream)
        .await;

    let response = server
        .post("/functions/v1/financial-analysis")
        .authorization_bearer(token)
        .json(&TestActionRequestBuilder::ratio_analysis().without("statements").body())
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
