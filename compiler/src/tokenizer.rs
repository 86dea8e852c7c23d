use crate::error::CompileError;
use crate::utils::{error, quote};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r#"("(?:[^"\\\n]|\\.)*"|-?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?|[=,{}\[\]]|[A-Za-z_][A-Za-z0-9_\-]*|#.*|//.*|/\*(?s:.*?)\*/|\s+)"#
    )
    .expect("token regex is valid");
    pub static ref SKIP_RX: Regex = Regex::new(r"^(#.*|//.*|/\*(?s:.*)\*/|\s+)$").expect("skip regex is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    String,
    Number,
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:   TokenKind,
    /// Raw source text. String tokens keep their quotes and escapes.
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

impl Token {
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }
}

fn classify(part: &str) -> TokenKind {
    match part.chars().next() {
        Some('"') => TokenKind::String,
        Some(c) if c == '-' || c.is_ascii_digit() => TokenKind::Number,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => TokenKind::Ident,
        _ => TokenKind::Punct,
    }
}

pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end = mat.end();
        let part = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !SKIP_RX.is_match(part) {
            tokens.push(Token {
                kind: classify(part),
                text: part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.chars().count() + 1;
            }
        } else {
            column += part.chars().count();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_attribute() {
        let got = tokenize_schema("version = \"v1alpha\"").unwrap();
        let expected = vec![
            Token { kind: TokenKind::Ident,  text: "version".into(),     line: 1, column: 1 },
            Token { kind: TokenKind::Punct,  text: "=".into(),           line: 1, column: 9 },
            Token { kind: TokenKind::String, text: "\"v1alpha\"".into(), line: 1, column: 11 },
            Token { kind: TokenKind::Eof,    text: "".into(),            line: 1, column: 20 },
        ];
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_block_with_comments() {
        let input = "# header\nmodel Person { // trailing\n  /* multi\n line */ int32 age { default = -5 }\n}";
        let got = tokenize_schema(input).unwrap();
        assert_eq!(
            texts(&got),
            ["model", "Person", "{", "int32", "age", "{", "default", "=", "-5", "}", "}", ""]
        );
        let age = &got[4];
        assert_eq!((age.line, age.column), (4, 16));
        assert_eq!(got[8].kind, TokenKind::Number);
    }

    #[test]
    fn test_tokenize_string_with_escapes() {
        let got = tokenize_schema(r#"expression = "^\"[a-z]\\d\"$""#).unwrap();
        assert_eq!(got[2].kind, TokenKind::String);
        assert_eq!(got[2].text, r#""^\"[a-z]\\d\"$""#);
    }

    #[test]
    fn test_tokenize_list_and_float() {
        let got = tokenize_schema("values = [\"a\", \"b\"]\nminimum = 1.5e3").unwrap();
        assert_eq!(
            texts(&got),
            ["values", "=", "[", "\"a\"", ",", "\"b\"", "]", "minimum", "=", "1.5e3", ""]
        );
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let err = tokenize_schema("name = \"unterminated").unwrap_err();
        assert!(
            matches!(err, CompileError::Syntax { line: 1, column: 8, .. }),
            "expected a syntax error but got {:?}",
            err
        );

        let err = tokenize_schema("tag = @").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
    }
}
