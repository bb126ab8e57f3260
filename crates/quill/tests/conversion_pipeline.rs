//! End-to-end conversion tests against a mock pandoc host.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use baton::{ErrorData, Handler};
use quill::error::{SERVER_ERROR, TIMEOUT_ERROR};
use quill::{ConvertError, ConvertHandler, TOOL_NAME};
use quillconf::BackendConfig;
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn handler_for(server: &MockServer) -> ConvertHandler {
    handler_with_timeout(server, 30_000)
}

fn handler_with_timeout(server: &MockServer, timeout_ms: u64) -> ConvertHandler {
    ConvertHandler::new(&BackendConfig {
        url: Some(format!("{}/convert", server.uri())),
        timeout_ms,
    })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[tokio::test]
async fn test_missing_contents_never_reaches_backend() {
    let server = MockServer::start().await;
    let handler = handler_for(&server);

    for args in [json!({}), json!({ "contents": null }), json!({ "contents": ["a"] })] {
        let err = handler.convert(&args).await.unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)), "{:?}", err);
    }

    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_unsupported_format_never_reaches_backend() {
    let server = MockServer::start().await;
    let handler = handler_for(&server);

    let err = handler
        .call_tool(TOOL_NAME, json!({ "contents": "x", "output_format": "odt" }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorData::INVALID_PARAMS);
    assert!(err.message.contains("odt"));
    assert!(err.message.contains("markdown, html, pdf, docx, rst, latex, epub, txt"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_text_reply_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_json(json!({
            "contents": "# Hello",
            "input_format": "markdown",
            "output_format": "html"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "converted_content": "<h1 id=\"hello\">Hello</h1>\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = handler_for(&server)
        .call_tool(TOOL_NAME, json!({ "contents": "# Hello", "output_format": "HTML" }))
        .await
        .unwrap();

    assert_eq!(result.text_content(), "<h1 id=\"hello\">Hello</h1>\n");
    assert_eq!(result.is_error, None);
}

#[tokio::test]
async fn test_text_reply_saved_to_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "converted_content": "Hello\n=====\n"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs/out.rst");

    let message = handler_for(&server)
        .convert(&json!({
            "contents": "# Hello",
            "output_format": "rst",
            "output_file": out.to_str().unwrap()
        }))
        .await
        .unwrap();

    assert_eq!(
        message,
        format!("Content successfully converted and saved to: {}", out.display())
    );
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "Hello\n=====\n");
}

#[tokio::test]
async fn test_binary_reply_saved_byte_for_byte() {
    let bytes: Vec<u8> = (0..=255u8).collect();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_content_base64": STANDARD.encode(&bytes),
            "output_format": "docx"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.docx");

    let message = handler_for(&server)
        .convert(&json!({
            "contents": "# Report",
            "output_format": "docx",
            "output_file": out.to_str().unwrap()
        }))
        .await
        .unwrap();

    assert_eq!(
        message,
        format!("Content successfully converted to docx and saved to: {}", out.display())
    );
    assert_eq!(std::fs::read(&out).unwrap(), bytes);
}

#[tokio::test]
async fn test_binary_reply_without_output_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_content_base64": STANDARD.encode(b"%PDF-1.7"),
            "output_format": "pdf"
        })))
        .mount(&server)
        .await;

    let err = handler_for(&server)
        .convert(&json!({ "contents": "# Report", "output_format": "pdf" }))
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::MissingOutputPath { .. }));
    assert!(err.to_string().contains("'output_file' was not specified"));
}

#[tokio::test]
async fn test_success_without_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let err = handler_for(&server)
        .call_tool(TOOL_NAME, json!({ "contents": "x" }))
        .await
        .unwrap_err();

    assert_eq!(err.code, SERVER_ERROR);
    assert_eq!(err.data.unwrap()["kind"], "empty_backend_reply");
}

#[tokio::test]
async fn test_error_status_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Pandoc conversion failed: unknown reader"
        })))
        .mount(&server)
        .await;

    let err = handler_for(&server)
        .convert(&json!({ "contents": "x", "input_format": "rst" }))
        .await
        .unwrap_err();

    match err {
        ConvertError::BackendStatus { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Pandoc conversion failed: unknown reader");
        }
        other => panic!("expected BackendStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_with_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = handler_for(&server).convert(&json!({ "contents": "x" })).await.unwrap_err();
    assert!(matches!(err, ConvertError::BackendStatus { status: 502, ref message } if message == "Bad Gateway"));
}

#[tokio::test]
async fn test_non_json_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = handler_for(&server).convert(&json!({ "contents": "x" })).await.unwrap_err();
    assert!(matches!(err, ConvertError::InvalidBackendReply(_)));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "converted_content": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = handler_with_timeout(&server, 200)
        .call_tool(TOOL_NAME, json!({ "contents": "x" }))
        .await
        .unwrap_err();

    assert_eq!(err.code, TIMEOUT_ERROR);
    assert_eq!(err.data.unwrap()["kind"], "backend_timeout");
}

#[tokio::test]
async fn test_refused_connection_names_endpoint() {
    // Grab a free port, then close it so nothing listens there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let endpoint = format!("http://127.0.0.1:{}/convert", port);
    let handler = ConvertHandler::new(&BackendConfig {
        url: Some(endpoint.clone()),
        timeout_ms: 5_000,
    });

    let err = handler.convert(&json!({ "contents": "x" })).await.unwrap_err();

    match &err {
        ConvertError::BackendUnreachable { endpoint: reported, .. } => assert_eq!(reported, &endpoint),
        other => panic!("expected BackendUnreachable, got {:?}", other),
    }
    assert!(err.to_string().contains(&endpoint));
}

/// A host that answers 200 but hangs up halfway through the body.
async fn truncating_host() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request.ends_with(b"}") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"converted_content\":",
            )
            .await
            .unwrap();
        let _ = socket.shutdown().await;
    });

    format!("http://{}/convert", addr)
}

#[tokio::test]
async fn test_truncated_body_is_not_unreachable() {
    let handler = ConvertHandler::new(&BackendConfig {
        url: Some(truncating_host().await),
        timeout_ms: 5_000,
    });

    let err = handler.convert(&json!({ "contents": "x" })).await.unwrap_err();

    assert!(matches!(err, ConvertError::InvalidBackendReply(_)), "{:?}", err);
    assert!(err.to_string().contains("failed to read reply body"));
}

#[tokio::test]
async fn test_unset_endpoint_still_lists_tools() {
    let handler = ConvertHandler::new(&BackendConfig::default());

    assert_eq!(handler.tools().len(), 1);

    let err = handler.convert(&json!({ "contents": "x" })).await.unwrap_err();
    assert!(matches!(err, ConvertError::Configuration(_)));
}

#[tokio::test]
async fn test_identical_calls_are_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "converted_content": "<p>same</p>"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("same.html");
    let args = json!({
        "contents": "same",
        "output_format": "html",
        "output_file": out.to_str().unwrap()
    });
    let handler = handler_for(&server);

    let first = handler.convert(&args).await.unwrap();
    let first_bytes = std::fs::read(&out).unwrap();
    let second = handler.convert(&args).await.unwrap();
    let second_bytes = std::fs::read(&out).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_unwritable_output_reports_conversion_succeeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "converted_content": "text"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let err = handler_for(&server)
        .convert(&json!({
            "contents": "x",
            "output_file": blocker.join("out.txt").to_str().unwrap()
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, ConvertError::Persistence { .. }));
    assert!(err.to_string().starts_with("Conversion via host succeeded"));
}
