//! CLI help text and action names used in logs.

use crate::cli::parse::Action;

pub const AFTER_HELP: &str = "\
Examples:
  cet main.zig
  cet --compiler g132 --args \"-O2 -march=native\" main.cpp
  cet --once --source main.c
  cet --root .. --watch-project src/main.zig
  cet --list-compilers rust

Configuration is read from ~/.config/cet/config.toml, then .cet/config.toml
in the current directory, then CET__SECTION__KEY environment variables.";

/// Short name for an action, used in structured logs.
pub fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Compile { once: true, .. } => "compile",
        Action::Compile { once: false, .. } => "watch",
        Action::ListCompilers { .. } => "list_compilers",
        Action::PrintConfig => "print_config",
    }
}
