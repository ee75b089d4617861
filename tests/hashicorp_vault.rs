//! HashiCorp Vault backend against a mocked KV v2 API.
//!
//! Every credential is one key in the data map of `kv/data/terraform`, so
//! writes must carry the other keys along untouched.

use serde_json::{json, Value};
use terracreds::credentials::backends::{HashiCorpSettings, HashiCorpVaultBackend, VaultBackend};
use terracreds::credentials::{SecretString, WriteMethod};
use terracreds::ErrorKind;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SECRET_PATH: &str = "/v1/kv/data/terraform";

fn backend(server: &MockServer, key: &str) -> HashiCorpVaultBackend {
    HashiCorpVaultBackend::new(HashiCorpSettings {
        address: server.uri(),
        token: SecretString::new("test-token"),
        mount: "kv".into(),
        path: "terraform".into(),
        key: key.into(),
    })
    .unwrap()
}

fn version_metadata() -> Value {
    json!({
        "created_time": "2024-05-01T10:00:00.000000Z",
        "custom_metadata": null,
        "deletion_time": "",
        "destroyed": false,
        "version": 1,
    })
}

fn envelope(data: Value) -> Value {
    json!({
        "request_id": "5a1f3c8e-0000-4000-8000-000000000001",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": data,
        "wrap_info": null,
        "warnings": null,
        "auth": null,
    })
}

/// KV v2 read response holding `data`.
fn secret(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(envelope(json!({ "data": data, "metadata": version_metadata() })))
}

fn written() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(envelope(version_metadata()))
}

fn missing() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "errors": [] }))
}

/// Matches a KV v2 write whose data map is exactly `expected`.
fn writes(expected: Value) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    move |request: &Request| {
        request.body_json::<Value>().map(|body| body["data"] == expected).unwrap_or(false)
    }
}

async fn mount_read(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SECRET_PATH))
        .and(header("X-Vault-Token", "test-token"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_on_missing_secret_reports_created() {
    let server = MockServer::start().await;
    mount_read(&server, missing()).await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .and(writes(json!({ "app.terraform.io": "tok" })))
        .respond_with(written())
        .expect(1)
        .mount(&server)
        .await;

    let method = backend(&server, "app.terraform.io").create(&SecretString::new("tok")).await.unwrap();
    assert_eq!(method, WriteMethod::Created);
}

#[tokio::test]
async fn test_create_adds_key_and_keeps_others() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "other.example.com": "keep-me" }))).await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .and(writes(json!({ "other.example.com": "keep-me", "app.terraform.io": "tok" })))
        .respond_with(written())
        .expect(1)
        .mount(&server)
        .await;

    let method = backend(&server, "app.terraform.io").create(&SecretString::new("tok")).await.unwrap();
    assert_eq!(method, WriteMethod::Created);
}

#[tokio::test]
async fn test_create_existing_key_reports_updated() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "app.terraform.io": "old", "other.example.com": "keep-me" })))
        .await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .and(writes(json!({ "app.terraform.io": "new", "other.example.com": "keep-me" })))
        .respond_with(written())
        .expect(1)
        .mount(&server)
        .await;

    let method = backend(&server, "app.terraform.io").create(&SecretString::new("new")).await.unwrap();
    assert_eq!(method, WriteMethod::Updated);
}

#[tokio::test]
async fn test_delete_one_of_several_keys_rewrites_the_map() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "app.terraform.io": "tok", "other.example.com": "keep-me" })))
        .await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .and(writes(json!({ "other.example.com": "keep-me" })))
        .respond_with(written())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(SECRET_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    backend(&server, "app.terraform.io").delete().await.unwrap();
}

#[tokio::test]
async fn test_delete_last_key_removes_latest_version() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "app.terraform.io": "tok" }))).await;

    Mock::given(method("DELETE"))
        .and(path(SECRET_PATH))
        .and(header("X-Vault-Token", "test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .respond_with(written())
        .expect(0)
        .mount(&server)
        .await;

    backend(&server, "app.terraform.io").delete().await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_key_is_not_found_and_writes_nothing() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "other.example.com": "keep-me" }))).await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .respond_with(written())
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(SECRET_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = backend(&server, "app.terraform.io").delete().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_reads_one_key() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "app.terraform.io": "tok", "other.example.com": "x" }))).await;

    assert_eq!(backend(&server, "app.terraform.io").get().await.unwrap(), b"tok");
}

#[tokio::test]
async fn test_list_follows_input_order() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "a": "1", "b": "2", "c": "3" }))).await;

    let names = vec!["c".to_string(), "a".to_string(), "b".to_string()];
    let values = backend(&server, "unused").list(&names).await.unwrap();
    assert_eq!(values, vec!["3", "1", "2"]);
}

#[tokio::test]
async fn test_list_stops_at_first_missing_name() {
    let server = MockServer::start().await;
    mount_read(&server, secret(json!({ "a": "1", "c": "3" }))).await;

    let names = vec!["a".to_string(), "missing".to_string(), "c".to_string()];
    let err = backend(&server, "unused").list(&names).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn test_forbidden_read_aborts_create() {
    let server = MockServer::start().await;
    mount_read(
        &server,
        ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(SECRET_PATH))
        .respond_with(written())
        .expect(0)
        .mount(&server)
        .await;

    let err = backend(&server, "app.terraform.io").create(&SecretString::new("tok")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}
