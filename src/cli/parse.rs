//! CLI parse: clap types for cet. No behavior beyond picking the action.

use clap::Parser;
use std::path::PathBuf;

use crate::cli::help::AFTER_HELP;

/// cet - Compiler Explorer in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "cet", version)]
#[command(about = "Compile a local file on Compiler Explorer and watch the assembly")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Source file to compile
    #[arg(required_unless_present_any = ["list_compilers", "print_config"])]
    pub file: Option<PathBuf>,

    /// Compiler Explorer server URL (default: https://godbolt.org)
    #[arg(long)]
    pub server: Option<String>,

    /// Compiler id, e.g. ztrunk, g132, clang_trunk, r1830 (default: ztrunk)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Arguments passed to the compiler
    #[arg(long, allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Compile once and exit
    #[arg(long)]
    pub once: bool,

    /// Show the highlighted source above the assembly
    #[arg(long)]
    pub source: bool,

    /// Directory searched for sibling files (default: the file's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Send only the main file
    #[arg(long)]
    pub no_collect: bool,

    /// Recompile when any project source changes, not just the main file
    #[arg(long)]
    pub watch_project: bool,

    /// AT&T syntax instead of Intel
    #[arg(long)]
    pub att: bool,

    /// Compile to a binary and disassemble it
    #[arg(long)]
    pub binary: bool,

    /// Prefix each assembly line with the source line it came from
    #[arg(long)]
    pub map: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List the server's compilers for a language (zig, c, cpp, rust, go, python) and exit
    #[arg(long, value_name = "LANG")]
    pub list_compilers: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log to stderr at debug level
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// What a parsed command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Compile { file: PathBuf, once: bool },
    ListCompilers { language: String },
    PrintConfig,
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.print_config {
            return Action::PrintConfig;
        }
        if let Some(language) = &self.list_compilers {
            return Action::ListCompilers {
                language: language.clone(),
            };
        }
        Action::Compile {
            file: self.file.clone().unwrap_or_default(),
            once: self.once,
        }
    }
}
