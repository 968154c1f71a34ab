//! Downstream forwarder tests against a mock HTTP server.

use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultbase::GatewayError;
use vaultbase::config::DownstreamConfig;
use vaultbase::proxy::DownstreamClient;

fn client_for(server: &MockServer) -> DownstreamClient {
    DownstreamClient::new(DownstreamConfig {
        base_url: server.uri(),
        auth_token: "downstream-token".to_string(),
        ..DownstreamConfig::default()
    })
}

#[tokio::test]
async fn post_json_forwards_body_and_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/caching/set"))
        .and(header("authorization", "downstream-token"))
        .and(body_json(json!({"uid": "7", "key": "greeting"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .expect(1)
        .mount(&server)
        .await;

    let forwarded = client_for(&server)
        .post_json("/api/caching/set", &json!({"uid": "7", "key": "greeting"}))
        .await
        .unwrap();
    assert_eq!(forwarded.status.as_u16(), 200);
    assert_eq!(forwarded.body, Bytes::from_static(b"stored"));
}

#[tokio::test]
async fn post_bytes_forwards_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/storage/upload-file"))
        .and(query_param("name", "photo.png"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let forwarded = client_for(&server)
        .post_bytes(
            "/api/storage/upload-file",
            &[("uid", "7"), ("name", "photo.png")],
            Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        )
        .await
        .unwrap();
    assert_eq!(forwarded.status.as_u16(), 201);
}

#[tokio::test]
async fn get_passes_successful_body_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/caching/get"))
        .and(query_param("key", "greeting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "hello"})))
        .mount(&server)
        .await;

    let forwarded = client_for(&server)
        .get("/api/caching/get", &[("uid", "7"), ("key", "greeting")])
        .await
        .unwrap();
    assert_eq!(forwarded.status.as_u16(), 200);
    let body: serde_json::Value = serde_json::from_slice(&forwarded.body).unwrap();
    assert_eq!(body["value"], "hello");
}

#[tokio::test]
async fn reserved_characters_in_query_values_stay_one_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/caching/get"))
        .and(query_param("uid", "7"))
        .and(query_param("key", "a&b=c#d"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let forwarded = client_for(&server)
        .get("/api/caching/get", &[("uid", "7"), ("key", "a&b=c#d")])
        .await
        .unwrap();
    assert_eq!(forwarded.status.as_u16(), 200);
}

#[tokio::test]
async fn downstream_404_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/api/caching/get", &[("uid", "7"), ("key", "missing")])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn downstream_conflict_and_precondition_map_to_already_exists() {
    for status in [409, 412] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post_json("/api/caching/set", &json!({"key": "dup"}))
            .await
            .unwrap_err();
        assert!(
            matches!(err, GatewayError::AlreadyExists { .. }),
            "status {status} should map to AlreadyExists"
        );
    }
}

#[tokio::test]
async fn downstream_server_error_maps_to_internal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get("/api/caching/get", &[("uid", "7"), ("key", "greeting")])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Internal { .. }));
}
