//! Integration tests for Configuration System

use cet::config::{global_config_path, CetConfig, ConfigLoader};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_without_any_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());
    assert_eq!(config.server.url, "https://godbolt.org");
    assert_eq!(config.compile.compiler, "ztrunk");
    assert_eq!(config.watch.debounce_ms, 100);
    assert_eq!(config.collect.skip_files, vec!["build.zig".to_string()]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_global_config_path_follows_xdg() {
    let test_dir = TempDir::new().unwrap();
    let path = with_xdg_env(&test_dir, || global_config_path().unwrap());
    assert_eq!(path, test_dir.path().join("config").join("cet").join("config.toml"));
}

#[test]
fn test_workspace_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_xdg_env(&test_dir, || {
        write(
            &global_config_path().unwrap(),
            r#"
[server]
url = "http://localhost:10240"

[compile]
compiler = "g132"
args = "-O1"
"#,
        );
        write(
            &workspace.path().join(".cet").join("config.toml"),
            r#"
[compile]
compiler = "clang_trunk"

[watch]
clear_screen = false
"#,
        );
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.server.url, "http://localhost:10240");
    assert_eq!(config.compile.compiler, "clang_trunk");
    assert_eq!(config.compile.args, "-O1");
    assert!(!config.watch.clear_screen);
}

#[test]
fn test_env_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join(".cet").join("config.toml"),
        "[compile]\ncompiler = \"ztrunk\"\n",
    );
    write(
        &workspace.path().join(".cet").join("ci.toml"),
        "[compile]\ncompiler = \"z0130\"\n\n[display]\ncolor = false\n",
    );

    let config = with_xdg_env(&test_dir, || {
        std::env::set_var("CET_ENV", "ci");
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.compile.compiler, "z0130");
    assert!(!config.display.color);
}

#[test]
fn test_environment_variables_override_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join(".cet").join("config.toml"),
        "[watch]\ndebounce_ms = 250\n",
    );

    let config = with_xdg_env(&test_dir, || {
        std::env::set_var("CET__WATCH__DEBOUNCE_MS", "40");
        let config = ConfigLoader::load(workspace.path());
        std::env::remove_var("CET__WATCH__DEBOUNCE_MS");
        config.unwrap()
    });

    assert_eq!(config.watch.debounce_ms, 40);
}

#[test]
fn test_load_from_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("cet.toml");
    write(
        &config_file,
        r#"
[filters]
intel = false
binary = true

[collect]
skip_dirs = ["vendor"]
skip_files = []

[logging]
level = "debug"
output = "stderr"
"#,
    );

    let config: CetConfig = ConfigLoader::load_from_file(&config_file).unwrap();
    let filters = config.filters.to_filters();
    assert!(!filters.intel);
    assert!(filters.binary);
    assert!(filters.demangle);
    assert_eq!(config.collect.skip_dirs, vec!["vendor".to_string()]);
    assert!(config.collect.skip_files.is_empty());
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_print_config_round_trips_through_loader() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = CetConfig::default();
    config.compile.compiler = "r1830".to_string();
    config.watch.project = true;
    let config_file = temp_dir.path().join("effective.toml");
    fs::write(&config_file, config.to_toml_string().unwrap()).unwrap();

    let loaded = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(loaded.compile.compiler, "r1830");
    assert!(loaded.watch.project);
}
