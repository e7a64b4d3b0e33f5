//! Configuration System
//!
//! Layered configuration for the compile/watch loop: built-in defaults, the
//! user's global file, the workspace file, then `CET__*` environment variables.
//! CLI flags are applied on top by the caller.

use crate::api::{Filters, HttpSettings};
use crate::error::CetError;
use crate::logging::LoggingConfig;
use crate::project::CollectOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

pub const DEFAULT_SERVER: &str = "https://godbolt.org";
pub const DEFAULT_COMPILER: &str = "ztrunk";
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CetConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub compile: CompileConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub collect: CollectOptions,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Compiler Explorer server and HTTP timeouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Accepts `http://` and `https://` URLs with a plausible host.
    pub fn url_is_valid(url: &str) -> bool {
        let Some(rest) = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
        else {
            return false;
        };

        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return false;
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = if host_port.starts_with('[') {
            let Some(end_bracket) = host_port.find(']') else {
                return false;
            };
            &host_port[1..end_bracket]
        } else {
            host_port.split(':').next().unwrap_or_default()
        };

        if host.is_empty() {
            return false;
        }

        host == "localhost" || host.contains('.') || host.parse::<std::net::IpAddr>().is_ok()
    }
}

/// What to compile and with which compiler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,
    #[serde(default)]
    pub args: String,
    /// Search root for sibling files; the main file's directory when unset
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub show_source: bool,
    /// Send sibling files along with the main file
    #[serde(default = "default_true")]
    pub collect: bool,
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            args: String::new(),
            root: None,
            show_source: false,
            collect: true,
        }
    }
}

/// Filter switches as written in config files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_true")]
    pub comment_only: bool,
    #[serde(default = "default_true")]
    pub demangle: bool,
    #[serde(default = "default_true")]
    pub directives: bool,
    #[serde(default = "default_true")]
    pub intel: bool,
    #[serde(default = "default_true")]
    pub labels: bool,
    #[serde(default)]
    pub trim: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let filters = Filters::default();
        Self {
            binary: filters.binary,
            comment_only: filters.comment_only,
            demangle: filters.demangle,
            directives: filters.directives,
            intel: filters.intel,
            labels: filters.labels,
            trim: filters.trim,
        }
    }
}

impl FilterConfig {
    pub fn to_filters(&self) -> Filters {
        Filters {
            binary: self.binary,
            comment_only: self.comment_only,
            demangle: self.demangle,
            directives: self.directives,
            intel: self.intel,
            labels: self.labels,
            trim: self.trim,
        }
    }
}

/// Watch mode behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Quiet period after the last change before recompiling
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_true")]
    pub clear_screen: bool,
    /// Recompile when any project file changes, not just the main file
    #[serde(default)]
    pub project: bool,
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            clear_screen: true,
            project: false,
        }
    }
}

/// Terminal presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub color: bool,
    /// Syntect theme used for the source view
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Prefix assembly lines with the source line they came from
    #[serde(default)]
    pub source_map: bool,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            theme: default_theme(),
            source_map: false,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Server(String),
    Compile(String),
    Watch(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Server(msg) => write!(f, "Server: {}", msg),
            ValidationError::Compile(msg) => write!(f, "Compile: {}", msg),
            ValidationError::Watch(msg) => write!(f, "Watch: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CetConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !ServerConfig::url_is_valid(&self.server.url) {
            errors.push(ValidationError::Server(format!(
                "Invalid server URL: {}",
                self.server.url
            )));
        }
        if self.server.connect_timeout_secs == 0 || self.server.request_timeout_secs == 0 {
            errors.push(ValidationError::Server(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        let compiler = self.compile.compiler.trim();
        if compiler.is_empty() {
            errors.push(ValidationError::Compile(
                "Compiler id cannot be empty".to_string(),
            ));
        } else if compiler.contains('/') || compiler.chars().any(char::is_whitespace) {
            errors.push(ValidationError::Compile(format!(
                "Invalid compiler id: {}",
                self.compile.compiler
            )));
        }

        if self.watch.debounce_ms > 60_000 {
            errors.push(ValidationError::Watch(format!(
                "Debounce of {}ms is longer than a minute",
                self.watch.debounce_ms
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one configuration error.
    pub fn validated(self) -> Result<Self, CetError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CetError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, CetError> {
        toml::to_string_pretty(self)
            .map_err(|e| CetError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}
