use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use sdkforge_core::{
    CreateRequest, Endpoint, ExportFormat, JobStatus, OrchestratorError, RateLimit,
};
use sdkforge_engine::{ApiError, Backend, ClientSettings, ReqwestBackend};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(ClientSettings {
        base_url: format!("{}/api/v1", server.uri()),
        ..ClientSettings::default()
    })
    .expect("valid base url")
}

fn endpoint(id: &str, path: &str) -> Endpoint {
    Endpoint {
        id: id.to_string(),
        method: "GET".to_string(),
        path: path.to_string(),
        ..Endpoint::default()
    }
}

#[tokio::test]
async fn create_posts_request_and_parses_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/"))
        .and(body_json(json!({
            "name": "Petstore",
            "url": "https://petstore.example.com/docs",
            "force_refresh": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "name": "Petstore",
            "base_url": "https://petstore.example.com",
            "status": "PENDING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = backend_for(&server)
        .create(&CreateRequest {
            name: "Petstore".into(),
            url: "https://petstore.example.com/docs".into(),
            ..CreateRequest::default()
        })
        .await
        .expect("create ok");
    assert_eq!(handle.id, "p1");
    assert_eq!(handle.status, JobStatus::Pending);
}

#[tokio::test]
async fn rate_limit_carries_detail_and_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "60")
                .set_body_json(json!({"detail": "Too many projects created"})),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .create(&CreateRequest {
            name: "A".into(),
            url: "https://a.example.com".into(),
            ..CreateRequest::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::RateLimited {
            detail: "Too many projects created".into(),
            retry_after_secs: Some(60),
        }
    );
    let message = OrchestratorError::from(err).user_message();
    assert!(message.contains("60s"), "{message}");
}

#[tokio::test]
async fn server_errors_keep_their_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/p1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let err = backend_for(&server).status("p1").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            detail: "boom".into()
        }
    );
}

#[tokio::test]
async fn refused_connection_maps_to_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend = ReqwestBackend::new(ClientSettings {
        base_url: format!("http://127.0.0.1:{port}/api/v1"),
        ..ClientSettings::default()
    })
    .unwrap();

    let err = backend.quota().await.unwrap_err();
    assert!(
        matches!(
            OrchestratorError::from(err.clone()),
            OrchestratorError::Unreachable(_)
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn history_and_quota_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p1", "name": "A", "base_url": "https://a", "status": "COMPLETED"},
            {"id": "p2", "name": "B", "base_url": "https://b", "status": "FAILED"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rate-limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "used": 3, "limit": 10, "remaining": 7, "reset_in_seconds": 120
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let history = backend.history().await.expect("history ok");
    assert_eq!(
        history.iter().map(|job| job.status).collect::<Vec<_>>(),
        vec![JobStatus::Completed, JobStatus::Failed]
    );
    assert_eq!(
        backend.quota().await.expect("quota ok"),
        RateLimit {
            used: 3,
            limit: 10,
            remaining: 7,
            reset_in_seconds: 120
        }
    );
}

#[tokio::test]
async fn generate_sends_edited_endpoints() {
    let server = MockServer::start().await;
    let edited = vec![endpoint("a", "/a"), endpoint("c", "/c")];
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/p1/generate"))
        .and(query_param("language", "python"))
        .and(body_json(json!({ "endpoints": edited })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-zip".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = backend_for(&server)
        .generate("p1", "python", Some(&edited))
        .await
        .expect("generate ok");
    assert_eq!(bytes.as_ref(), b"PK-zip");
}

#[tokio::test]
async fn pristine_generate_sends_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/p1/generate"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .generate("p1", "go", None)
        .await
        .expect("generate ok");
}

#[tokio::test]
async fn export_uses_get_when_pristine_and_post_when_edited() {
    let server = MockServer::start().await;
    let edited = vec![endpoint("a", "/a")];
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/p1/export"))
        .and(query_param("format", "yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.0.0\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/projects/p1/export"))
        .and(query_param("format", "json"))
        .and(body_json(json!({ "endpoints": edited })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"openapi\":\"3.0.0\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let yaml = backend
        .export("p1", ExportFormat::Yaml, None)
        .await
        .expect("export ok");
    assert_eq!(yaml.as_ref(), b"openapi: 3.0.0\n");
    backend
        .export("p1", ExportFormat::Json, Some(&edited))
        .await
        .expect("export ok");
}

#[tokio::test]
async fn preview_reads_code_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/p1/preview"))
        .and(query_param("language", "python"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "client = Api()"})))
        .mount(&server)
        .await;

    let text = backend_for(&server)
        .preview("p1", "python", None)
        .await
        .expect("preview ok");
    assert_eq!(text, "client = Api()");
}

#[tokio::test]
async fn subscribe_yields_event_payloads_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/p1/logs/stream"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: ping\n\ndata: step 1\n\ndata: DONE\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let payloads = backend_for(&server)
        .subscribe("p1")
        .await
        .expect("stream opens")
        .collect::<Vec<_>>()
        .await;
    assert_eq!(
        payloads,
        vec![Ok("ping".to_string()), Ok("step 1".to_string()), Ok("DONE".to_string())]
    );
}

#[tokio::test]
async fn subscribe_skips_comments_and_joins_multi_line_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/p1/logs/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            ": keepalive\r\n\r\nevent: log\r\ndata: line a\r\ndata: line b\r\n\r\ndata: DONE\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let payloads = backend_for(&server)
        .subscribe("p1")
        .await
        .expect("stream opens")
        .collect::<Vec<_>>()
        .await;
    assert_eq!(
        payloads,
        vec![Ok("line a\nline b".to_string()), Ok("DONE".to_string())]
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestBackend::new(ClientSettings {
        base_url: "not a url".into(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}
