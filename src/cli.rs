//! CLI domain: parse, route, help, output, and presentation only.
//! Compiling and watching live in their own modules; the route table dispatches to them.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::action_name;
pub use output::map_error;
pub use parse::{Action, Cli};
pub use presentation::format_compilers_table;
pub use route::{apply_cli_overrides, RunContext};
