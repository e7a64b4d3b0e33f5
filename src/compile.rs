//! One compile cycle: read the main file, gather siblings, call the backend, render.

use crate::api::{CompileBackend, CompileRequest, FileEntry, Filters};
use crate::config::CetConfig;
use crate::error::CetError;
use crate::language::Language;
use crate::project::path::canonicalize_path;
use crate::project::{collect_project_files, resolve_search_dir, CollectOptions};
use crate::render::Renderer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything a compile cycle needs besides the backend
#[derive(Debug, Clone)]
pub struct CompileSettings {
    /// Main file as given on the command line
    pub file: PathBuf,
    pub compiler: String,
    pub args: String,
    pub filters: Filters,
    pub root: Option<PathBuf>,
    pub show_source: bool,
    pub collect: bool,
    pub collect_options: CollectOptions,
}

impl CompileSettings {
    pub fn from_config(file: PathBuf, config: &CetConfig) -> Self {
        Self {
            file,
            compiler: config.compile.compiler.clone(),
            args: config.compile.args.clone(),
            filters: config.filters.to_filters(),
            root: config.compile.root.clone(),
            show_source: config.compile.show_source,
            collect: config.compile.collect,
            collect_options: config.collect.clone(),
        }
    }

    pub fn display_name(&self) -> String {
        self.file.display().to_string()
    }
}

pub struct CompileRunner<B> {
    backend: B,
    settings: CompileSettings,
    renderer: Renderer,
}

impl<B: CompileBackend> CompileRunner<B> {
    pub fn new(backend: B, settings: CompileSettings, renderer: Renderer) -> Self {
        Self {
            backend,
            settings,
            renderer,
        }
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one cycle and write the rendered result to `out`.
    ///
    /// Returns the compiler's exit code. A failed collection is reported as a
    /// warning and the compile goes ahead with the main file alone.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<i32, CetError> {
        let file = &self.settings.file;
        let bytes = std::fs::read(file).map_err(|source| CetError::ReadSource {
            path: file.clone(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes).into_owned();

        if self.settings.show_source {
            write!(
                out,
                "{}",
                self.renderer.source_view(&source, Language::from_path(file))
            )?;
        }

        let files = if self.settings.collect {
            match self.collect_files() {
                Ok(files) => files,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Project file collection failed");
                    writeln!(
                        out,
                        "{}",
                        self.renderer
                            .warning(&format!("Warning: could not collect project files: {}", e))
                    )?;
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let request = CompileRequest::new(
            source,
            self.settings.args.clone(),
            self.settings.filters,
            files,
        );
        debug!(
            compiler = %self.settings.compiler,
            server = %self.backend.server(),
            files = request.files.len(),
            "Compiling"
        );
        let response = self.backend.compile(&self.settings.compiler, &request).await?;

        write!(out, "{}", self.renderer.response(&response))?;
        out.flush()?;
        Ok(response.code)
    }

    /// Sibling files with the main file's extension, named relative to its directory.
    pub fn collect_files(&self) -> Result<Vec<FileEntry>, CetError> {
        let main = canonicalize_path(&self.settings.file)?;
        let main_dir = main
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CetError::InvalidPath(format!("{} has no parent", main.display())))?;
        let search_dir = resolve_search_dir(&main, self.settings.root.as_deref())?;

        let files = collect_project_files(
            &search_dir,
            &main,
            &main_dir,
            &self.settings.collect_options,
        )?;
        info!(
            search_dir = %search_dir.display(),
            count = files.len(),
            "Collected project files"
        );
        Ok(files)
    }
}
