//! CLI route: run context folding config and flags, and the action dispatch.

use crate::api::{CompileBackend, ExplorerClient};
use crate::cli::help::action_name;
use crate::cli::parse::{Action, Cli};
use crate::cli::presentation::format_compilers_table;
use crate::compile::{CompileRunner, CompileSettings};
use crate::config::{CetConfig, ConfigLoader};
use crate::error::CetError;
use crate::language::Language;
use crate::render::Renderer;
use crate::watch::{WatchConfig, WatchSession};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Runtime context for CLI execution: effective config plus the requested action.
/// Built from the workspace directory and optional config path using ConfigLoader only.
pub struct RunContext {
    config: CetConfig,
    action: Action,
    config_path: Option<PathBuf>,
}

impl RunContext {
    pub fn new(cli: &Cli, workspace_root: &Path) -> Result<Self, CetError> {
        let config = match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };
        let config = apply_cli_overrides(config, cli).validated()?;

        Ok(Self {
            config,
            action: cli.action(),
            config_path: cli.config.clone(),
        })
    }

    pub fn config(&self) -> &CetConfig {
        &self.config
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Execute the action, writing user-facing output to `out`.
    ///
    /// Returns once the compile (or listing) finishes; in watch mode only when
    /// the watcher stops.
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<(), CetError> {
        let started = Instant::now();
        info!(
            action = action_name(&self.action),
            config = ?self.config_path,
            server = %self.config.server.url,
            "Executing"
        );
        let result = self.execute_inner(out);
        debug!(
            action = action_name(&self.action),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Action finished"
        );
        result
    }

    fn execute_inner<W: Write>(&self, out: &mut W) -> Result<(), CetError> {
        match &self.action {
            Action::PrintConfig => {
                write!(out, "{}", self.config.to_toml_string()?)?;
                Ok(())
            }
            Action::ListCompilers { language } => {
                let language_id = Language::from_explorer_id(language)
                    .map(|lang| lang.explorer_id().to_string())
                    .unwrap_or_else(|| language.trim().to_string());
                let client = self.client()?;
                let runtime = runtime()?;
                let compilers = runtime.block_on(client.list_compilers(&language_id))?;
                writeln!(out, "{}", format_compilers_table(&language_id, &compilers))?;
                Ok(())
            }
            Action::Compile { file, once } => {
                if !file.exists() {
                    return Err(CetError::SourceNotFound(file.clone()));
                }
                let runner = CompileRunner::new(
                    self.client()?,
                    CompileSettings::from_config(file.clone(), &self.config),
                    Renderer::new(&self.config.display)?,
                );
                let runtime = runtime()?;
                if *once {
                    let code = runtime.block_on(runner.run(out))?;
                    debug!(code, "Single compile finished");
                    Ok(())
                } else {
                    let session = WatchSession::new(runner, WatchConfig::from(&self.config.watch));
                    session.start(&runtime, out)
                }
            }
        }
    }

    fn client(&self) -> Result<ExplorerClient, CetError> {
        ExplorerClient::new(&self.config.server.url, self.config.server.http_settings())
    }
}

fn runtime() -> Result<Runtime, CetError> {
    Runtime::new().map_err(CetError::IoError)
}

/// `NO_COLOR` counts only when present and non-empty.
fn no_color_requested(value: Option<&OsStr>) -> bool {
    value.map_or(false, |value| !value.is_empty())
}

/// Fold command-line flags over the loaded configuration.
pub fn apply_cli_overrides(mut config: CetConfig, cli: &Cli) -> CetConfig {
    if let Some(server) = &cli.server {
        config.server.url = server.clone();
    }
    if let Some(compiler) = &cli.compiler {
        config.compile.compiler = compiler.clone();
    }
    if let Some(args) = &cli.args {
        config.compile.args = args.clone();
    }
    if let Some(root) = &cli.root {
        config.compile.root = Some(root.clone());
    }
    if cli.source {
        config.compile.show_source = true;
    }
    if cli.no_collect {
        config.compile.collect = false;
    }
    if cli.watch_project {
        config.watch.project = true;
    }
    if cli.att {
        config.filters.intel = false;
    }
    if cli.binary {
        config.filters.binary = true;
    }
    if cli.map {
        config.display.source_map = true;
    }
    if cli.no_color || no_color_requested(std::env::var_os("NO_COLOR").as_deref()) {
        config.display.color = false;
    }
    config
}
