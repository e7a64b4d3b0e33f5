//! cet: Compiler Explorer in the terminal
//!
//! Sends a local source file, plus the sibling files it depends on, to a
//! Compiler Explorer server and renders the returned assembly. In watch mode
//! the file is recompiled on every save.

pub mod api;
pub mod cli;
pub mod compile;
pub mod config;
pub mod error;
pub mod language;
pub mod logging;
pub mod project;
pub mod render;
pub mod watch;
