//! Source language detection from file extensions.

use std::path::Path;

/// Languages the tool knows how to highlight and list compilers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Zig,
    C,
    Cpp,
    Rust,
    Go,
    Python,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Zig,
        Language::C,
        Language::Cpp,
        Language::Rust,
        Language::Go,
        Language::Python,
    ];

    /// Detect the language from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "zig" => Some(Language::Zig),
            "c" => Some(Language::C),
            "cpp" | "cc" | "cxx" => Some(Language::Cpp),
            "rs" => Some(Language::Rust),
            "go" => Some(Language::Go),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// Accepts either the highlighter name or the Compiler Explorer language id.
    pub fn from_explorer_id(id: &str) -> Option<Language> {
        let id = id.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == id || lang.explorer_id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Zig => "zig",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Python => "python",
        }
    }

    /// Language id used by `/api/compilers/{id}`
    pub fn explorer_id(&self) -> &'static str {
        match self {
            Language::Cpp => "c++",
            other => other.name(),
        }
    }

    /// Extension syntect uses to find the bundled grammar.
    pub(crate) fn syntax_extension(&self) -> &'static str {
        match self {
            Language::Zig => "zig",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rs",
            Language::Go => "go",
            Language::Python => "py",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
