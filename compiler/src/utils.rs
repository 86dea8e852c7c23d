use crate::error::CompileError;

/// Quotes `text` as a JSON string literal. The output is also a valid Go
/// interpreted string literal.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> CompileError {
    CompileError::Syntax {
        msg: msg.to_string(),
        line,
        column,
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn to_title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Lower-cases the first character and leaves the rest untouched.
pub fn to_lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().to_string() + chars.as_str(),
    }
}

/// Converts a string to snake_case.
/// Consecutive uppercase letters stay together so that acronyms remain
/// intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

const RUST_KEYWORDS: [&str; 52] = [
    "as", "break", "const", "continue", "crate", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl",
    "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "async", "await", "dyn",
    "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual",
    "yield", "try", "gen",
];

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    if RUST_KEYWORDS.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Prefixes identifiers that start with a digit, which every target rejects.
pub fn escape_leading_digit(s: &str) -> String {
    match s.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", s),
        _ => s.to_string(),
    }
}
