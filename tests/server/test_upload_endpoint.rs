//! Tests for `POST /api/upload`.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use regex::Regex;
use repodrop::{
    AppState, ExtensionSource, NamingStrategy, ServerConfig, Uploader, UploaderConfig, router,
};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

struct Harness {
    server: MockServer,
    spool: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            spool: tempfile::tempdir().unwrap(),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            spool_dir: self.spool.path().to_path_buf(),
            ..ServerConfig::default()
        }
    }

    fn state(&self, ensure_destination: bool) -> AppState {
        let mut config = uploader_config(&self.server);
        config.ensure_destination = ensure_destination;
        self.state_with(config)
    }

    fn state_with(&self, config: UploaderConfig) -> AppState {
        AppState::new(Uploader::new(config).unwrap(), self.server_config())
    }

    fn spool_is_empty(&self) -> bool {
        dir_is_empty(self.spool.path())
    }
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(body))
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn contents_put() -> wiremock::MockBuilder {
    Mock::given(method("PUT")).and(path_regex(format!(
        r"^/repos/{OWNER}/{REPO}/contents/uploads/.+$"
    )))
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let h = Harness::start().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/upload")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(h.state(false), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "success": false, "error": "Method not allowed" }));
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() {
    let h = Harness::start().await;
    contents_put()
        .respond_with(ResponseTemplate::new(201).set_body_json(file_commit_body("x")))
        .expect(0)
        .mount(&h.server)
        .await;

    let body = multipart_body(&[("note", None, b"hello".as_slice())]);
    let (status, body) = send(h.state(false), upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "No file uploaded" }));
}

#[tokio::test]
async fn test_empty_file_is_bad_request() {
    let h = Harness::start().await;
    let body = multipart_body(&[("file", Some("empty.txt"), b"".as_slice())]);

    let (status, body) = send(h.state(false), upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Uploaded file is empty");
    assert!(h.spool_is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let h = Harness::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(h.state(false), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_configuration_is_reported_without_network_calls() {
    let h = Harness::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let config_error = UploaderConfig::from_lookup(|key| match key {
        "GITHUB_OWNER" => Some(OWNER.to_string()),
        "GITHUB_REPO" => Some(REPO.to_string()),
        _ => None,
    })
    .unwrap_err();
    let state = AppState::misconfigured(config_error, h.server_config());

    let body = multipart_body(&[("file", Some("a.png"), PNG_10.as_slice())]);
    let (status, body) = send(state, upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Env Vars"), "{message}");
    assert!(message.contains("GITHUB_TOKEN"), "{message}");
}

#[tokio::test]
async fn test_png_upload_returns_raw_link() {
    let h = Harness::start().await;
    contents_put()
        .and(body_partial_json(json!({
            "content": "iVBORw0KGgoAAQ==",
            "branch": BRANCH
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(file_commit_body("uploads/x.png")))
        .expect(1)
        .mount(&h.server)
        .await;

    let body = multipart_body(&[("file", Some("a.png"), PNG_10.as_slice())]);
    let (status, body) = send(h.state(false), upload_request(body)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["commit"], COMMIT_SHA);
    let url = body["url"].as_str().unwrap();
    let expected = Regex::new(&format!(
        r"^https://raw\.githubusercontent\.com/{OWNER}/{REPO}/{BRANCH}/uploads/\d+-[0-9a-z]{{6}}\.png$"
    ))
    .unwrap();
    assert!(expected.is_match(url), "unexpected url {url}");
    assert_eq!(body["filename"], "a.png");
    assert!(url.ends_with(body["path"].as_str().unwrap()));
    assert!(h.spool_is_empty());
}

#[tokio::test]
async fn test_rejected_credential_is_server_error() {
    let h = Harness::start().await;
    contents_put()
        .respond_with(bad_credentials())
        .expect(1)
        .mount(&h.server)
        .await;

    let body = multipart_body(&[("file", Some("a.png"), PNG_10.as_slice())]);
    let (status, body) = send(h.state(false), upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("authentication"), "{message}");
    assert!(body.get("url").is_none());
    assert!(h.spool_is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_github() {
    let h = Harness::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut config = uploader_config(&h.server);
    config.ensure_destination = false;
    let server_config = ServerConfig {
        max_upload_bytes: 16,
        ..h.server_config()
    };
    let state = AppState::new(Uploader::new(config).unwrap(), server_config);

    let payload = vec![0u8; 64];
    let body = multipart_body(&[("file", Some("big.bin"), payload.as_slice())]);
    let (status, body) = send(state, upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("16 bytes"));
    assert!(h.spool_is_empty());
}

#[tokio::test]
async fn test_first_file_field_wins() {
    let h = Harness::start().await;
    contents_put()
        .and(body_partial_json(json!({ "content": "Zmlyc3Q=" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(file_commit_body("uploads/x.bin")))
        .expect(1)
        .mount(&h.server)
        .await;

    let body = multipart_body(&[
        ("caption", None, b"ignored".as_slice()),
        ("file", Some("one.txt"), b"first".as_slice()),
        ("file", Some("two.txt"), b"second".as_slice()),
    ]);
    let (status, body) = send(h.state(false), upload_request(body)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["filename"], "one.txt");
    assert!(body["path"].as_str().unwrap().ends_with(".bin"));
}

#[tokio::test]
async fn test_full_flow_provisions_destination() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path(repo_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_body()))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path(ref_path(BRANCH)))
        .respond_with(not_found())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path(ref_path("main")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ref_body("main", "base123")))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::path(format!("/repos/{OWNER}/{REPO}/git/refs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(ref_body(BRANCH, "base123")))
        .expect(1)
        .mount(&h.server)
        .await;
    contents_put()
        .respond_with(ResponseTemplate::new(201).set_body_json(file_commit_body("uploads/x.png")))
        .expect(1)
        .mount(&h.server)
        .await;

    let body = multipart_body(&[("file", Some("a.png"), PNG_10.as_slice())]);
    let (status, body) = send(h.state(true), upload_request(body)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["url"].as_str().unwrap().ends_with(".png"));
}

async fn upload_with(
    adjust: impl FnOnce(&mut UploaderConfig),
    path_pattern: String,
    filename: &str,
) -> Value {
    let h = Harness::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(path_pattern))
        .respond_with(ResponseTemplate::new(201).set_body_json(file_commit_body("uploads/x")))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut config = uploader_config(&h.server);
    config.ensure_destination = false;
    adjust(&mut config);

    let body = multipart_body(&[("file", Some(filename), PNG_10.as_slice())]);
    let (status, body) = send(h.state_with(config), upload_request(body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_name_timestamp_strategy_names_the_object() {
    let body = upload_with(
        |config| config.naming = NamingStrategy::NameTimestamp,
        format!(r"^/repos/{OWNER}/{REPO}/contents/uploads/holidaypic-\d+\.png$"),
        "holiday pic.jpg",
    )
    .await;

    assert!(body["path"].as_str().unwrap().starts_with("uploads/holidaypic-"));
}

#[tokio::test]
async fn test_timestamp_name_strategy_names_the_object() {
    let body = upload_with(
        |config| config.naming = NamingStrategy::TimestampName,
        format!(r"^/repos/{OWNER}/{REPO}/contents/uploads/\d+-holidaypic\.png$"),
        "holiday pic.jpg",
    )
    .await;

    assert!(body["path"].as_str().unwrap().ends_with("-holidaypic.png"));
}

#[tokio::test]
async fn test_filename_extension_source_keeps_declared_extension() {
    let body = upload_with(
        |config| config.extension_source = ExtensionSource::FileName,
        format!(r"^/repos/{OWNER}/{REPO}/contents/uploads/\d+-[0-9a-z]{{6}}\.jpg$"),
        "holiday pic.JPG",
    )
    .await;

    assert!(body["url"].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_unusable_api_url_is_reported_per_request() {
    let h = Harness::start().await;
    let mut config = uploader_config(&h.server);
    config.api_url = "http://exa mple.com".to_string();

    let state = AppState::from_config(Ok(config), h.server_config());
    let body = multipart_body(&[("file", Some("a.png"), PNG_10.as_slice())]);
    let (status, body) = send(state, upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("client setup"), "{body}");
}

#[tokio::test]
async fn test_upload_page_is_served() {
    let h = Harness::start().await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = router(h.state(false)).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("/script.js"));
}
