//! Project Files
//!
//! Collects the sibling sources that ride along with the main file in a
//! multi-file compile request.

pub mod path;
pub mod walker;

pub use walker::{collect_project_files, resolve_search_dir, CollectOptions};
