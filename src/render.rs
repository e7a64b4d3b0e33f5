//! Terminal rendering
//!
//! Everything cet prints to stdout goes through [`Renderer`]: the source view,
//! compiler output, the assembly listing and the watch banners. With color
//! disabled every method produces plain text.

pub mod asm;
pub mod highlight;

use crate::api::{AsmLine, CompileResponse};
use crate::config::DisplayConfig;
use crate::error::CetError;
use crate::language::Language;
use asm::AsmPalette;
use highlight::SourceHighlighter;
use owo_colors::Style;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RULE: &str = "━━━";

pub struct Renderer {
    highlighter: Option<SourceHighlighter>,
    palette: AsmPalette,
    color: bool,
    source_map: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Result<Self, CetError> {
        let highlighter = if display.color {
            Some(SourceHighlighter::new(&display.theme)?)
        } else {
            None
        };
        Ok(Self {
            highlighter,
            palette: AsmPalette::default(),
            color: display.color,
            source_map: display.source_map,
        })
    }

    /// Renderer without any escape sequences.
    pub fn plain() -> Self {
        Self {
            highlighter: None,
            palette: AsmPalette::default(),
            color: false,
            source_map: false,
        }
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    /// Escape sequence clearing the terminal; empty when color is off.
    pub fn clear_screen(&self) -> &'static str {
        if self.color {
            CLEAR_SCREEN
        } else {
            ""
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            style.style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, title: &str) -> String {
        self.paint(&format!("{RULE} {title} {RULE}"), Style::new().cyan().bold())
    }

    pub fn warning(&self, message: &str) -> String {
        self.paint(message, Style::new().yellow())
    }

    pub fn error(&self, message: &str) -> String {
        self.paint(message, Style::new().red())
    }

    /// Heading followed by the highlighted source, newline terminated.
    pub fn source_view(&self, code: &str, language: Option<Language>) -> String {
        let body = match &self.highlighter {
            Some(highlighter) => highlighter.highlight(code, language),
            None => code.to_string(),
        };
        format!("{}\n{}\n", self.heading("Source"), body)
    }

    /// Compiler stderr (red), stdout (plain), a non-zero exit note, then the assembly.
    pub fn response(&self, response: &CompileResponse) -> String {
        let mut out = String::new();

        for line in &response.stderr {
            out.push_str(&self.error(&line.text));
            out.push('\n');
        }
        for line in &response.stdout {
            out.push_str(&line.text);
            out.push('\n');
        }
        if response.code != 0 {
            out.push_str(&self.error(&format!("Compiler exited with code {}", response.code)));
            out.push('\n');
        }

        if !response.asm.is_empty() {
            out.push('\n');
            out.push_str(&self.heading("Assembly"));
            out.push('\n');
            out.push_str(&self.assembly(&response.asm));
        }

        out
    }

    /// Assembly listing, one line per entry, optionally with a source-line gutter.
    pub fn assembly(&self, lines: &[AsmLine]) -> String {
        let mut out = String::new();
        for line in lines {
            if self.source_map {
                let gutter = match line.main_source_line() {
                    Some(n) => format!("{n:>5} │ "),
                    None => format!("{:>5} │ ", ""),
                };
                out.push_str(&self.paint(&gutter, Style::new().bright_black()));
            }
            if self.color {
                out.push_str(&self.palette.paint_line(&line.text));
            } else {
                out.push_str(&line.text);
            }
            out.push('\n');
        }
        out
    }

    pub fn watch_banner(&self, file: &str, compiler: &str, args: &str, server: &str) -> String {
        let title = self.paint(&format!("⚡ Watching {file}"), Style::new().green().bold());
        let args = if args.is_empty() { "(none)" } else { args };
        format!(
            "{title}\n   Compiler: {compiler}\n   Args:     {args}\n   Server:   {server}\n\n"
        )
    }

    /// Header printed before each recompile; `time` is pre-formatted `HH:MM:SS`.
    pub fn recompile_header(&self, file: &str, time: &str) -> String {
        format!(
            "{}\n\n",
            self.paint(&format!("⚡ {file} — {time}"), Style::new().blue().bold())
        )
    }
}
