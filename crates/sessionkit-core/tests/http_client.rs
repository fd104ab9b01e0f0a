mod common;

use serde_json::{json, Value};
use sessionkit_core::{ApiError, Config, HttpClient, HttpError, TokenStore};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{config_for, empty_store, store_with, token_expiring_in};

async fn authorization_of_last_request(server: &MockServer) -> Option<String> {
    let requests = server.received_requests().await.expect("recording enabled");
    let last = requests.last().expect("at least one request");
    last.headers
        .get("authorization")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_valid_session_sends_bearer_token() {
    let server = MockServer::start().await;
    let token = token_expiring_in("alice", 3600);
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("Authorization", format!("Bearer {}", token).as_str()))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Alice"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), store_with(&token)).unwrap();
    let me: Value = client.get("/me").await.unwrap();
    assert_eq!(me["name"], "Alice");
}

#[tokio::test]
async fn test_no_authorization_without_valid_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let expired = token_expiring_in("alice", -60);
    for store in [empty_store(), store_with(&expired), store_with("not-a-jwt")] {
        let client = HttpClient::new(&config, store).unwrap();
        let _: Value = client.get("public").await.unwrap();
        assert_eq!(authorization_of_last_request(&server).await, None);
    }
}

#[tokio::test]
async fn test_header_follows_store_at_call_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), empty_store()).unwrap();
    let _: Value = client.get("/ping").await.unwrap();
    assert_eq!(authorization_of_last_request(&server).await, None);

    let token = token_expiring_in("bob", 600);
    client.store().set(&token).unwrap();
    let _: Value = client.get("/ping").await.unwrap();
    assert_eq!(authorization_of_last_request(&server).await, Some(format!("Bearer {}", token)));

    client.store().clear().unwrap();
    let _: Value = client.get("/ping").await.unwrap();
    assert_eq!(authorization_of_last_request(&server).await, None);
}

#[tokio::test]
async fn test_not_found_is_http_error_without_parsing_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>definitely not json</html>"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), empty_store()).unwrap();
    let err = client.get::<Value>("/missing").await.unwrap_err();
    match err {
        ApiError::Http(HttpError { status, status_text }) => {
            assert_eq!(status, 404);
            assert_eq!(status_text, "Not Found");
        }
        other => panic!("expected HttpError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "down"})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), empty_store()).unwrap();
    let err = client.post::<Value, _>("/items", &json!({"a": 1})).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_success_with_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), empty_store()).unwrap();
    let err = client.get::<Value>("/text").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)), "{:?}", err);
}

#[tokio::test]
async fn test_verb_helpers_send_json_bodies() {
    let server = MockServer::start().await;
    for verb in ["PUT", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/api/items/7"))
            .and(body_json(json!({"name": "tent"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verb": verb})))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/api/items/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&config_for(&server), empty_store()).unwrap();
    let body = json!({"name": "tent"});
    let put: Value = client.put("/items/7", &body).await.unwrap();
    let patch: Value = client.patch("/items/7", &body).await.unwrap();
    let deleted: Value = client.delete("/items/7").await.unwrap();

    assert_eq!(put["verb"], "PUT");
    assert_eq!(patch["verb"], "PATCH");
    assert_eq!(deleted["deleted"], true);
}

#[tokio::test]
async fn test_absolute_path_bypasses_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let client = HttpClient::new(&Config::default(), empty_store()).unwrap();
    let items: Vec<u32> = client.get(&format!("{}/elsewhere", server.uri())).await.unwrap();
    assert_eq!(items, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    // Nothing listens on port 1
    let config = Config::default().with_origin("http://127.0.0.1:1");
    let client = HttpClient::new(&config, empty_store()).unwrap();
    let err = client.get::<Value>("/anything").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "{:?}", err);
}
