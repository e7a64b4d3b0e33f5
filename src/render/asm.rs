//! Assembly colorizer for GAS output in Intel or AT&T syntax (x86-64, AArch64)

use owo_colors::Style;

/// Lexical class of an assembly token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmTokenKind {
    Label,
    Directive,
    Mnemonic,
    Register,
    Number,
    Str,
    Keyword,
    Symbol,
    Comment,
    Punct,
    Space,
}

const SIZE_KEYWORDS: &[&str] = &[
    "byte", "word", "dword", "qword", "tbyte", "xmmword", "ymmword", "zmmword", "ptr", "offset",
    "flat",
];

const FIXED_REGISTERS: &[&str] = &[
    // x86
    "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rbp", "rsp", "eax", "ebx", "ecx", "edx", "esi",
    "edi", "ebp", "esp", "ax", "bx", "cx", "dx", "si", "di", "bp", "sp", "al", "ah", "bl", "bh",
    "cl", "ch", "dl", "dh", "sil", "dil", "bpl", "spl", "rip", "eip", "ip", "cs", "ds", "es",
    "fs", "gs", "ss", "st", // aarch64
    "wsp", "xzr", "wzr", "lr", "fp", "pc", "nzcv",
];

fn numbered(name: &str, prefix: &str, max: u32) -> bool {
    name.strip_prefix(prefix)
        .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u32>().ok())
        .map(|n| n <= max)
        .unwrap_or(false)
}

/// Whether `name` is an x86-64 or AArch64 register name.
pub fn is_register(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if FIXED_REGISTERS.contains(&name.as_str()) {
        return true;
    }

    // r8..r15 with optional d/w/b suffix
    let base = name.trim_end_matches(['d', 'w', 'b']);
    if numbered(base, "r", 15)
        && base.len() > 1
        && base[1..].parse::<u32>().map_or(false, |n| n >= 8)
    {
        return true;
    }

    ["xmm", "ymm", "zmm"].iter().any(|p| numbered(&name, p, 31))
        || numbered(&name, "k", 7)
        || ["x", "w", "v", "q", "d", "s", "h", "b"]
            .iter()
            .any(|p| numbered(&name, p, 31))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$')
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '@')
}

fn take_while(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|(_, c)| !pred(*c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn number_len(s: &str) -> usize {
    let body_start = usize::from(s.starts_with('-'));
    let body = &s[body_start..];
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return 0;
    }
    body_start + take_while(body, |c| c.is_ascii_alphanumeric())
}

fn string_len(s: &str) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    s.len()
}

fn comment_start(rest: &str) -> bool {
    rest.starts_with("//")
        || rest.starts_with(';')
        || (rest.starts_with('#')
            && !rest[1..].starts_with(|c: char| c.is_ascii_digit() || c == '-'))
}

/// Split one line of assembly into classified tokens.
///
/// Concatenating the token texts reproduces the line exactly.
pub fn tokenize_line(line: &str) -> Vec<(AsmTokenKind, &str)> {
    let mut tokens = Vec::new();
    let mut rest = line;

    let indent = take_while(rest, char::is_whitespace);
    if indent > 0 {
        tokens.push((AsmTokenKind::Space, &rest[..indent]));
        rest = &rest[indent..];
    }

    // Unindented lines ending in ':' are labels, demangled signatures included
    let trimmed = rest.trim_end();
    if indent == 0 && trimmed.len() > 1 && trimmed.ends_with(':') {
        tokens.push((AsmTokenKind::Label, trimmed));
        if trimmed.len() < rest.len() {
            tokens.push((AsmTokenKind::Space, &rest[trimmed.len()..]));
        }
        return tokens;
    }

    // Optional label, quoted or bare
    let label_len = if rest.starts_with('"') {
        let len = string_len(rest);
        if rest[len..].starts_with(':') {
            len + 1
        } else {
            0
        }
    } else {
        let len = take_while(rest, is_ident_char);
        if len > 0 && rest[len..].starts_with(':') && !rest[len..].starts_with("::") {
            len + 1
        } else {
            0
        }
    };
    if label_len > 0 {
        tokens.push((AsmTokenKind::Label, &rest[..label_len]));
        rest = &rest[label_len..];
    }

    let mut expect_op = true;
    while !rest.is_empty() {
        let c = rest.chars().next().unwrap_or(' ');

        let (kind, len) = if c.is_whitespace() {
            (AsmTokenKind::Space, take_while(rest, char::is_whitespace))
        } else if comment_start(rest) {
            (AsmTokenKind::Comment, rest.len())
        } else if expect_op && is_ident_start(c) {
            expect_op = false;
            let len = take_while(rest, is_ident_char);
            if c == '.' {
                (AsmTokenKind::Directive, len)
            } else {
                (AsmTokenKind::Mnemonic, len)
            }
        } else if c == '"' {
            (AsmTokenKind::Str, string_len(rest))
        } else if (c == '%') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            (AsmTokenKind::Register, 1 + take_while(&rest[1..], is_ident_char))
        } else if (c == '$' || c == '#') && number_len(&rest[1..]) > 0 {
            (AsmTokenKind::Number, 1 + number_len(&rest[1..]))
        } else if number_len(rest) > 0 {
            (AsmTokenKind::Number, number_len(rest))
        } else if is_ident_start(c) {
            let len = take_while(rest, is_ident_char);
            let word = &rest[..len];
            if is_register(word) {
                (AsmTokenKind::Register, len)
            } else if SIZE_KEYWORDS.contains(&word.to_ascii_lowercase().as_str()) {
                (AsmTokenKind::Keyword, len)
            } else {
                (AsmTokenKind::Symbol, len)
            }
        } else {
            (AsmTokenKind::Punct, c.len_utf8())
        };

        tokens.push((kind, &rest[..len]));
        rest = &rest[len..];
    }

    tokens
}

/// Style per token class
#[derive(Debug, Clone, Copy)]
pub struct AsmPalette {
    pub label: Style,
    pub directive: Style,
    pub mnemonic: Style,
    pub register: Style,
    pub number: Style,
    pub string: Style,
    pub keyword: Style,
    pub comment: Style,
}

impl Default for AsmPalette {
    fn default() -> Self {
        Self {
            label: Style::new().bright_yellow().bold(),
            directive: Style::new().magenta(),
            mnemonic: Style::new().bright_blue().bold(),
            register: Style::new().cyan(),
            number: Style::new().bright_green(),
            string: Style::new().green(),
            keyword: Style::new().italic(),
            comment: Style::new().bright_black(),
        }
    }
}

impl AsmPalette {
    fn style_for(&self, kind: AsmTokenKind) -> Option<Style> {
        match kind {
            AsmTokenKind::Label => Some(self.label),
            AsmTokenKind::Directive => Some(self.directive),
            AsmTokenKind::Mnemonic => Some(self.mnemonic),
            AsmTokenKind::Register => Some(self.register),
            AsmTokenKind::Number => Some(self.number),
            AsmTokenKind::Str => Some(self.string),
            AsmTokenKind::Keyword => Some(self.keyword),
            AsmTokenKind::Comment => Some(self.comment),
            AsmTokenKind::Symbol | AsmTokenKind::Punct | AsmTokenKind::Space => None,
        }
    }

    /// Colorize a single line (no trailing newline).
    pub fn paint_line(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len() * 2);
        for (kind, text) in tokenize_line(line) {
            match self.style_for(kind) {
                Some(style) => out.push_str(&style.style(text).to_string()),
                None => out.push_str(text),
            }
        }
        out
    }
}
