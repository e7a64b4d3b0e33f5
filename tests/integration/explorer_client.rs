//! Integration tests for the HTTP client against a fake Compiler Explorer

use cet::api::{CompileBackend, CompileRequest, ExplorerClient, FileEntry, Filters, HttpSettings};
use cet::error::CetError;
use std::time::Duration;

use crate::integration::{FakeExplorer, SQUARE_RESPONSE};

fn client(server: &FakeExplorer) -> ExplorerClient {
    ExplorerClient::new(server.url(), HttpSettings::default()).unwrap()
}

#[tokio::test]
async fn test_compile_posts_json_to_compiler_endpoint() {
    let server = FakeExplorer::with_body(SQUARE_RESPONSE);
    let request = CompileRequest::new(
        "export fn square(x: i32) i32 { return x * x; }".to_string(),
        "-O ReleaseFast".to_string(),
        Filters::default(),
        vec![FileEntry {
            filename: "util.zig".to_string(),
            contents: "pub const y = 2;".to_string(),
        }],
    );

    let response = client(&server).compile("ztrunk", &request).await.unwrap();
    assert_eq!(response.code, 0);
    assert_eq!(response.asm.len(), 4);
    assert_eq!(response.stdout[0].text, "compiled");

    let recorded = server.requests();
    assert_eq!(recorded.len(), 1);
    let sent = &recorded[0];
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.path, "/api/compiler/ztrunk/compile");
    assert_eq!(sent.header("content-type"), Some("application/json"));
    assert_eq!(sent.header("accept"), Some("application/json"));

    let body = sent.json();
    assert_eq!(body["options"]["userArguments"], "-O ReleaseFast");
    assert_eq!(body["options"]["filters"]["intel"], true);
    assert_eq!(body["options"]["filters"]["commentOnly"], true);
    assert_eq!(body["files"][0]["filename"], "util.zig");
}

#[tokio::test]
async fn test_compile_without_files_omits_field() {
    let server = FakeExplorer::with_body(SQUARE_RESPONSE);
    let request =
        CompileRequest::new("int x;".to_string(), String::new(), Filters::default(), vec![]);
    client(&server).compile("g132", &request).await.unwrap();

    let body = server.requests()[0].json();
    assert!(body.get("files").is_none());
    assert_eq!(body["source"], "int x;");
}

#[tokio::test]
async fn test_non_json_body_is_parse_error_with_preview() {
    let server = FakeExplorer::with_body(&"<html>".repeat(200));
    let request = CompileRequest::new(String::new(), String::new(), Filters::default(), vec![]);
    let err = client(&server).compile("ztrunk", &request).await.unwrap_err();
    match err {
        CetError::InvalidResponse { preview, .. } => {
            assert_eq!(preview.len(), 500);
            assert!(preview.starts_with("<html>"));
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_with_text_body() {
    let server = FakeExplorer::start(|_| (404, "Unknown compiler id".to_string()));
    let request = CompileRequest::new(String::new(), String::new(), Filters::default(), vec![]);
    let err = client(&server).compile("nope", &request).await.unwrap_err();
    match err {
        CetError::HttpStatus { status, preview } => {
            assert_eq!(status, 404);
            assert_eq!(preview, "Unknown compiler id");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_compilers_uses_language_path() {
    let server = FakeExplorer::with_body(
        r#"[{"id": "ztrunk", "name": "zig trunk", "lang": "zig", "semver": "trunk"},
            {"id": "z0130", "name": "zig 0.13.0", "lang": "zig", "semver": "0.13.0"}]"#,
    );
    let compilers = client(&server).list_compilers("zig").await.unwrap();
    assert_eq!(compilers.len(), 2);
    assert_eq!(compilers[1].id, "z0130");

    let recorded = server.requests();
    let sent = &recorded[0];
    assert_eq!(sent.method, "GET");
    assert_eq!(sent.path, "/api/compilers/zig");
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    // Bind and drop to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let settings = HttpSettings {
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
    };
    let client = ExplorerClient::new(&format!("http://127.0.0.1:{port}/"), settings).unwrap();
    let request = CompileRequest::new(String::new(), String::new(), Filters::default(), vec![]);

    let err = client.compile("ztrunk", &request).await.unwrap_err();
    assert!(matches!(err, CetError::RequestFailed(_)));
    assert!(err.to_string().starts_with("failed to send request: "));
}
