//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::CetError;

/// Map domain errors to the single line printed after `Error: `.
pub fn map_error(e: &CetError) -> String {
    match e {
        CetError::SourceNotFound(path) => format!("file {} does not exist", path.display()),
        other => other.to_string(),
    }
}
