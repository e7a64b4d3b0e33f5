//! Integration tests for a full compile cycle over HTTP

use cet::api::{ExplorerClient, HttpSettings};
use cet::compile::{CompileRunner, CompileSettings};
use cet::config::CetConfig;
use cet::render::Renderer;
use std::fs;
use tempfile::TempDir;

use crate::integration::{FakeExplorer, SQUARE_RESPONSE};

fn zig_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("math")).unwrap();
    fs::create_dir_all(temp.path().join(".zig-cache")).unwrap();
    fs::write(src.join("main.zig"), "const m = @import(\"math/square.zig\");\n").unwrap();
    fs::write(
        src.join("math").join("square.zig"),
        "pub fn square(x: i32) i32 { return x * x; }\n",
    )
    .unwrap();
    fs::write(temp.path().join("build.zig"), "// build script\n").unwrap();
    fs::write(temp.path().join("root.zig"), "pub const root = 1;\n").unwrap();
    fs::write(temp.path().join(".zig-cache").join("cached.zig"), "junk\n").unwrap();
    temp
}

fn runner(server: &FakeExplorer, settings: CompileSettings) -> CompileRunner<ExplorerClient> {
    CompileRunner::new(
        ExplorerClient::new(server.url(), HttpSettings::default()).unwrap(),
        settings,
        Renderer::plain(),
    )
}

#[tokio::test]
async fn test_cycle_sends_siblings_and_prints_assembly() {
    let project = zig_project();
    let server = FakeExplorer::with_body(SQUARE_RESPONSE);
    let settings = CompileSettings::from_config(
        project.path().join("src").join("main.zig"),
        &CetConfig::default(),
    );

    let mut out = Vec::new();
    let code = runner(&server, settings).run(&mut out).await.unwrap();
    assert_eq!(code, 0);

    let body = server.requests()[0].json();
    let names: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["math/square.zig"]);
    assert_eq!(body["source"], "const m = @import(\"math/square.zig\");\n");

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(
        printed,
        "compiled\n\n━━━ Assembly ━━━\nsquare:\n        imul    edi, edi\n        mov     eax, edi\n        ret\n"
    );
}

#[tokio::test]
async fn test_root_widens_search_and_skips_build_and_cache() {
    let project = zig_project();
    let server = FakeExplorer::with_body(SQUARE_RESPONSE);
    let mut config = CetConfig::default();
    config.compile.root = Some(project.path().to_path_buf());
    let settings =
        CompileSettings::from_config(project.path().join("src").join("main.zig"), &config);

    runner(&server, settings).run(&mut Vec::new()).await.unwrap();

    let body = server.requests()[0].json();
    let names: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["../root.zig", "math/square.zig"]);
}

#[tokio::test]
async fn test_server_error_propagates() {
    let project = zig_project();
    let server = FakeExplorer::start(|_| (500, "internal error".to_string()));
    let settings = CompileSettings::from_config(
        project.path().join("src").join("main.zig"),
        &CetConfig::default(),
    );

    let mut out = Vec::new();
    let err = runner(&server, settings).run(&mut out).await.unwrap_err();
    assert!(err.to_string().contains("500"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_source_map_gutter_over_http() {
    let project = zig_project();
    let server = FakeExplorer::with_body(SQUARE_RESPONSE);
    let mut settings = CompileSettings::from_config(
        project.path().join("src").join("main.zig"),
        &CetConfig::default(),
    );
    settings.collect = false;

    let runner = CompileRunner::new(
        ExplorerClient::new(server.url(), HttpSettings::default()).unwrap(),
        settings,
        Renderer::plain().with_source_map(true),
    );
    let mut out = Vec::new();
    runner.run(&mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("    2 │         imul    edi, edi\n"));
    assert!(printed.contains("    3 │         ret\n"));
}
