//! Compiler Explorer API
//!
//! Wire types for the compile and compiler-listing endpoints, and the
//! backend trait the compile runner talks to. The HTTP implementation lives in
//! [`client`].

use crate::error::CetError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ExplorerClient, HttpSettings};

/// An extra file shipped alongside the main source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    pub contents: String,
}

/// Body of `POST /api/compiler/{id}/compile`
#[derive(Debug, Clone, Serialize)]
pub struct CompileRequest {
    pub source: String,
    pub options: CompileOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    pub user_arguments: String,
    pub filters: Filters,
}

/// Server-side assembly post-processing switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub binary: bool,
    pub comment_only: bool,
    pub demangle: bool,
    pub directives: bool,
    pub intel: bool,
    pub labels: bool,
    pub trim: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            binary: false,
            comment_only: true,
            demangle: true,
            directives: true,
            intel: true,
            labels: true,
            trim: false,
        }
    }
}

impl CompileRequest {
    pub fn new(
        source: String,
        user_arguments: String,
        filters: Filters,
        files: Vec<FileEntry>,
    ) -> Self {
        Self {
            source,
            options: CompileOptions {
                user_arguments,
                filters,
            },
            files,
        }
    }
}

/// Compile result; every field may be absent on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub stdout: Vec<OutputLine>,
    #[serde(default)]
    pub stderr: Vec<OutputLine>,
    #[serde(default)]
    pub asm: Vec<AsmLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputLine {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AsmLine {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source: Option<AsmSource>,
}

/// Source location an assembly line was generated from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AsmSource {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl AsmLine {
    /// Line in the main file this instruction maps to, if any.
    ///
    /// Lines attributed to another file (`file` set) are not main-file lines.
    pub fn main_source_line(&self) -> Option<u32> {
        let source = self.source.as_ref()?;
        if source.file.is_some() {
            return None;
        }
        source.line.filter(|line| *line > 0)
    }
}

/// Entry of `GET /api/compilers/{language}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub compiler_type: String,
    #[serde(default)]
    pub semver: String,
    #[serde(default)]
    pub instruction_set: Option<String>,
}

/// Compilation service seam
#[async_trait]
pub trait CompileBackend: Send + Sync {
    /// Compile `request` with the compiler identified by `compiler`
    async fn compile(
        &self,
        compiler: &str,
        request: &CompileRequest,
    ) -> Result<CompileResponse, CetError>;

    /// List the compilers available for a Compiler Explorer language id
    async fn list_compilers(&self, language: &str) -> Result<Vec<CompilerInfo>, CetError>;

    /// Base URL shown in banners and logs
    fn server(&self) -> &str;
}
