use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use listener::{router, AppState, MAX_BODY_BYTES};
use relay::{DispatchRequest, RelayConfig, RelayError, WorkflowDispatcher, REQUIRED_FIELDS};

const API_KEY: &str = "relay-test-key";

/// Records every dispatch and answers with a fixed result.
struct RecordingDispatcher {
    calls: Mutex<Vec<DispatchRequest>>,
    result: Result<(), RelayError>,
}

impl RecordingDispatcher {
    fn new(result: Result<(), RelayError>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            result,
        })
    }

    fn calls(&self) -> Vec<DispatchRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        _config: &RelayConfig,
        request: &DispatchRequest,
    ) -> Result<(), RelayError> {
        self.calls.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

fn config(branch: Option<&str>) -> RelayConfig {
    RelayConfig::builder()
        .owner("farabi")
        .repository("claims")
        .workflow_file("mock.yml")
        .branch(branch.map(str::to_string))
        .github_token("ghp_token")
        .api_key(API_KEY)
        .build()
        .unwrap()
}

fn app(dispatcher: Arc<RecordingDispatcher>, branch: Option<&str>) -> Router {
    router(AppState::new(config(branch), dispatcher))
}

fn valid_payload() -> Value {
    json!({
        "file_no": "F-2001",
        "patient_name_ar": "فاطمة علي",
        "service_name": "MRI",
        "service_price": "1200",
        "policy_expiry": "2027-03-01"
    })
}

fn post(key: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri("/");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(body.into()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

// ---------------------------------------------------------------------------
// Method gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
        let dispatcher = RecordingDispatcher::new(Ok(()));
        let request = Request::builder()
            .method(method.clone())
            .uri("/")
            .header("x-api-key", API_KEY)
            .body(Body::from(valid_payload().to_string()))
            .unwrap();

        let (status, content_type, body) = send(app(dispatcher.clone(), None), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {method}");
        assert_eq!(body, "Method Not Allowed");
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert!(dispatcher.calls().is_empty());
    }
}

#[tokio::test]
async fn test_any_path_is_relayed() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/submit/claim?source=form")
        .header("x-api-key", API_KEY)
        .body(Body::from(valid_payload().to_string()))
        .unwrap();

    let (status, _, _) = send(app(dispatcher.clone(), None), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispatcher.calls().len(), 1);
}

// ---------------------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, _, body) = send(
        app(dispatcher.clone(), None),
        post(None, valid_payload().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Unauthorized");
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized_even_with_bad_body() {
    for body in [valid_payload().to_string(), "{not json".to_string()] {
        let dispatcher = RecordingDispatcher::new(Ok(()));
        let (status, _, text) =
            send(app(dispatcher.clone(), None), post(Some("relay-test-kez"), body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(text, "Unauthorized");
        assert!(dispatcher.calls().is_empty());
    }
}

#[tokio::test]
async fn test_api_key_header_name_is_case_insensitive() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("X-API-Key", API_KEY)
        .body(Body::from(valid_payload().to_string()))
        .unwrap();

    let (status, _, _) = send(app(dispatcher, None), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_ascii_api_key_is_compared_as_bytes() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let config = RelayConfig::builder()
        .owner("farabi")
        .repository("claims")
        .workflow_file("mock.yml")
        .github_token("ghp_token")
        .api_key("clé")
        .build()
        .unwrap();
    let app = router(AppState::new(config, dispatcher.clone()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("x-api-key", HeaderValue::from_bytes("clé".as_bytes()).unwrap())
        .body(Body::from(valid_payload().to_string()))
        .unwrap();
    let (status, _, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK, "body {body:?}");
    assert_eq!(dispatcher.calls().len(), 1);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("x-api-key", HeaderValue::from_bytes("cle".as_bytes()).unwrap())
        .body(Body::from(valid_payload().to_string()))
        .unwrap();
    let (status, _, _) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Body size
// ---------------------------------------------------------------------------

fn oversized_body() -> Vec<u8> {
    vec![b'x'; MAX_BODY_BYTES + 1024 * 1024]
}

#[tokio::test]
async fn test_oversized_body_without_key_is_unauthorized() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, _, body) = send(app(dispatcher.clone(), None), post(None, oversized_body())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Unauthorized");
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_body_on_other_method_is_method_not_allowed() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::from(oversized_body()))
        .unwrap();

    let (status, _, body) = send(app(dispatcher.clone(), None), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "Method Not Allowed");
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_body_with_key_is_payload_too_large() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, content_type, body) = send(
        app(dispatcher.clone(), None),
        post(Some(API_KEY), oversized_body()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, "Payload Too Large");
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert!(dispatcher.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Payload gates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    for body in ["", "{", "file_no=1&service_name=x", "{\"file_no\": }"] {
        let dispatcher = RecordingDispatcher::new(Ok(()));
        let (status, _, text) = send(app(dispatcher.clone(), None), post(Some(API_KEY), body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(text, "Invalid JSON");
        assert!(dispatcher.calls().is_empty());
    }
}

#[tokio::test]
async fn test_first_missing_field_is_named() {
    for (index, field) in REQUIRED_FIELDS.iter().enumerate() {
        // Drop this field and every later one; the reported field must be this one.
        let mut payload = valid_payload();
        let fields = payload.as_object_mut().unwrap();
        for later in &REQUIRED_FIELDS[index..] {
            fields.remove(*later);
        }

        let dispatcher = RecordingDispatcher::new(Ok(()));
        let (status, _, body) = send(
            app(dispatcher.clone(), None),
            post(Some(API_KEY), payload.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, format!("Missing field: {field}"));
        assert!(dispatcher.calls().is_empty());
    }
}

#[tokio::test]
async fn test_whitespace_only_field_is_missing() {
    let mut payload = valid_payload();
    payload["policy_expiry"] = json!("  \n ");
    payload["service_price"] = json!("");

    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, _, body) = send(
        app(dispatcher, None),
        post(Some(API_KEY), payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing field: service_price");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_valid_request_is_dispatched() {
    let mut payload = valid_payload();
    payload["insurer"] = json!("Bupa");
    payload["visit_count"] = json!(3);

    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, content_type, body) = send(
        app(dispatcher.clone(), None),
        post(Some(API_KEY), payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, r#"{"ok":true}"#);

    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].git_ref.as_str(), "main");
    assert_eq!(serde_json::to_value(&calls[0].inputs).unwrap(), payload);
}

#[tokio::test]
async fn test_configured_branch_is_used_as_ref() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let (status, _, _) = send(
        app(dispatcher.clone(), Some("develop")),
        post(Some(API_KEY), valid_payload().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispatcher.calls()[0].git_ref.as_str(), "develop");
}

#[tokio::test]
async fn test_repeated_requests_are_not_deduplicated() {
    let dispatcher = RecordingDispatcher::new(Ok(()));
    let app = app(dispatcher.clone(), None);

    for _ in 0..2 {
        let (status, _, _) = send(
            app.clone(),
            post(Some(API_KEY), valid_payload().to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(dispatcher.calls().len(), 2);
}

#[tokio::test]
async fn test_upstream_error_is_internal_server_error() {
    let dispatcher = RecordingDispatcher::new(Err(RelayError::UpstreamError {
        status: 422,
        body: "bad input".to_string(),
    }));
    let (status, content_type, body) = send(
        app(dispatcher, None),
        post(Some(API_KEY), valid_payload().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "GitHub API error: 422\nbad input");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let dispatcher = RecordingDispatcher::new(Err(RelayError::UpstreamUnreachable {
        reason: "connection refused".to_string(),
    }));
    let (status, _, body) = send(
        app(dispatcher, None),
        post(Some(API_KEY), valid_payload().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "GitHub API unreachable: connection refused");
}
