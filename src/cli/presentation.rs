//! CLI presentation: compiler listing table.

use crate::api::CompilerInfo;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{ContentArrangement, Table};

pub fn format_compilers_table(language: &str, compilers: &[CompilerInfo]) -> String {
    if compilers.is_empty() {
        return format!("No compilers found for language '{}'.", language);
    }

    let mut sorted: Vec<&CompilerInfo> = compilers.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Version", "Arch"]);
    for compiler in sorted {
        table.add_row(vec![
            compiler.id.clone(),
            compiler.name.clone(),
            compiler.semver.clone(),
            compiler.instruction_set.clone().unwrap_or_default(),
        ]);
    }

    format!(
        "{}\n{} compiler(s) for '{}'",
        table,
        compilers.len(),
        language
    )
}
