//! Source highlighting with syntect's bundled grammars and themes

use crate::error::CetError;
use crate::language::Language;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use tracing::debug;

const RESET: &str = "\x1b[0m";

pub struct SourceHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SourceHighlighter {
    /// Load the default grammars and the named theme.
    pub fn new(theme_name: &str) -> Result<Self, CetError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes.themes.remove(theme_name).ok_or_else(|| {
            CetError::ConfigError(format!(
                "Unknown theme '{}' (available: {})",
                theme_name,
                Self::available_themes().join(", ")
            ))
        })?;

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Names of the bundled themes.
    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
        names.sort();
        names
    }

    /// Highlight `code` as 24-bit terminal escapes, ending with a reset.
    ///
    /// Languages without a bundled grammar render as plain text.
    pub fn highlight(&self, code: &str, language: Option<Language>) -> String {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_extension(lang.syntax_extension()))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        debug!(syntax = %syntax.name, "Highlighting source");

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(code.len() * 4);
        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
                Err(e) => {
                    debug!(error = %e, "Highlighting failed, falling back to plain text");
                    return code.to_string();
                }
            }
        }
        out.push_str(RESET);
        out
    }
}
