//! Integration tests for watch mode with a real filesystem watcher

use async_trait::async_trait;
use cet::api::{AsmLine, CompileBackend, CompileRequest, CompileResponse, CompilerInfo};
use cet::compile::{CompileRunner, CompileSettings};
use cet::config::CetConfig;
use cet::error::CetError;
use cet::render::Renderer;
use cet::watch::{WatchConfig, WatchSession};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use crate::integration::wait_until;

/// Backend counting compiles and echoing the source back as assembly
#[derive(Clone, Default)]
struct EchoBackend {
    compiles: Arc<AtomicUsize>,
    fail_next: Arc<AtomicUsize>,
}

#[async_trait]
impl CompileBackend for EchoBackend {
    async fn compile(
        &self,
        _compiler: &str,
        request: &CompileRequest,
    ) -> Result<CompileResponse, CetError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(0, Ordering::SeqCst) > 0 {
            return Err(CetError::RequestFailed("Connection error: refused".to_string()));
        }
        Ok(CompileResponse {
            asm: vec![AsmLine {
                text: format!("; {}", request.source.trim()),
                source: None,
            }],
            ..CompileResponse::default()
        })
    }

    async fn list_compilers(&self, _language: &str) -> Result<Vec<CompilerInfo>, CetError> {
        Ok(vec![])
    }

    fn server(&self) -> &str {
        "http://fake"
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct Running {
    backend: EchoBackend,
    output: SharedBuffer,
    stop: cet::watch::StopHandle,
    handle: thread::JoinHandle<Result<(), CetError>>,
}

impl Running {
    fn compiles(&self) -> usize {
        self.backend.compiles.load(Ordering::SeqCst)
    }

    fn finish(self) -> String {
        self.stop.stop();
        self.handle.join().unwrap().unwrap();
        self.output.contents()
    }
}

fn start_watch(file: &Path, config: WatchConfig) -> Running {
    start_watch_with_root(file, None, config)
}

fn start_watch_with_root(file: &Path, root: Option<&Path>, config: WatchConfig) -> Running {
    let backend = EchoBackend::default();
    let mut settings = CompileSettings::from_config(file.to_path_buf(), &CetConfig::default());
    settings.collect = false;
    settings.root = root.map(Path::to_path_buf);
    let runner = CompileRunner::new(backend.clone(), settings, Renderer::plain());
    let session = WatchSession::new(runner, config);
    let stop = session.stop_handle();

    let output = SharedBuffer::default();
    let mut writer = output.clone();
    let handle = thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        session.start(&runtime, &mut writer)
    });

    Running {
        backend,
        output,
        stop,
        handle,
    }
}

fn config(debounce_ms: u64) -> WatchConfig {
    WatchConfig {
        debounce: Duration::from_millis(debounce_ms),
        clear_screen: false,
        project: false,
    }
}

#[test]
fn test_initial_compile_then_recompile_on_write() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    fs::write(&file, "const a = 1;\n").unwrap();

    let running = start_watch(&file, config(50));
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    fs::write(&file, "const a = 2;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 2));

    let output = running.finish();
    assert!(output.starts_with("⚡ Watching "));
    assert!(output.contains("   Compiler: ztrunk\n"));
    assert!(output.contains("; const a = 1;"));
    assert!(output.contains("; const a = 2;"));
    assert!(output.contains("main.zig — "));
}

#[test]
fn test_burst_of_writes_collapses_into_one_recompile() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.c");
    fs::write(&file, "int v = 0;\n").unwrap();

    let running = start_watch(&file, config(400));
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    for i in 1..=5 {
        fs::write(&file, format!("int v = {i};\n")).unwrap();
    }
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 2));
    thread::sleep(Duration::from_millis(800));
    assert_eq!(running.compiles(), 2);

    let output = running.finish();
    assert!(output.contains("; int v = 5;"));
}

#[test]
fn test_unrelated_file_does_not_trigger() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    fs::write(&file, "const a = 1;\n").unwrap();

    let running = start_watch(&file, config(50));
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    fs::write(temp.path().join("other.zig"), "const b = 1;\n").unwrap();
    thread::sleep(Duration::from_millis(500));
    assert_eq!(running.compiles(), 1);

    running.finish();
}

#[test]
fn test_project_mode_triggers_on_sibling() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    let lib = temp.path().join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::write(&file, "const a = 1;\n").unwrap();
    fs::write(lib.join("util.zig"), "pub const u = 1;\n").unwrap();

    let running = start_watch(
        &file,
        WatchConfig {
            project: true,
            ..config(50)
        },
    );
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    fs::write(lib.join("util.zig"), "pub const u = 2;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 2));

    running.finish();
}

#[test]
fn test_compile_error_keeps_watching() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    fs::write(&file, "const a = 1;\n").unwrap();

    let running = start_watch(&file, config(50));
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    running.backend.fail_next.store(1, Ordering::SeqCst);
    fs::write(&file, "const a = 2;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 2));
    assert!(wait_until(Duration::from_secs(2), || running
        .output
        .contents()
        .contains("Error: failed to send request: Connection error: refused")));

    fs::write(&file, "const a = 3;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 3));

    let output = running.finish();
    assert!(output.contains("; const a = 3;"));
}

#[test]
fn test_project_mode_with_root_elsewhere_still_watches_main() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    let lib = temp.path().join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::write(&file, "const a = 1;\n").unwrap();
    fs::write(lib.join("util.zig"), "pub const u = 1;\n").unwrap();

    let running = start_watch_with_root(
        &file,
        Some(&lib),
        WatchConfig {
            project: true,
            ..config(50)
        },
    );
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    fs::write(&file, "const a = 2;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 2));

    let output = running.finish();
    assert!(output.contains("; const a = 2;"));
}

#[test]
fn test_plain_output_never_clears_screen() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("main.zig");
    fs::write(&file, "const a = 1;\n").unwrap();

    let running = start_watch(
        &file,
        WatchConfig {
            clear_screen: true,
            ..config(50)
        },
    );
    assert!(wait_until(Duration::from_secs(5), || running.compiles() == 1));

    fs::write(&file, "const a = 2;\n").unwrap();
    assert!(wait_until(Duration::from_secs(5), || running.compiles() >= 2));

    let output = running.finish();
    assert!(output.contains("main.zig — "));
    assert!(!output.contains('\x1b'));
}
