//! Parses tokens into a generic body tree: attributes (`name = expr`) and
//! blocks (`keyword label* { body }`). Mapping the tree onto schema types is
//! left to [`crate::decode`].

use crate::{
    error::CompileError,
    tokenizer::{Token, TokenKind},
    utils::{error, quote},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(String),
    /// Raw numeric text, converted once the target primitive is known.
    Number(String),
    Bool(bool),
    List(Vec<Expr>),
}

impl Expr {
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::String(_) => "string",
            Expr::Number(_) => "number",
            Expr::Bool(_) => "bool",
            Expr::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name:   String,
    pub value:  Expr,
    pub line:   usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind:   String,
    pub labels: Vec<String>,
    pub body:   Body,
    pub line:   usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub attributes: Vec<Attribute>,
    /// Blocks in source order.
    pub blocks:     Vec<Block>,
}

impl Body {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Deepest block or list nesting the parser accepts.
pub const MAX_NESTING: usize = 64;

pub fn parse_schema(tokens: &[Token]) -> Result<Body, CompileError> {
    let mut index = 0;

    fn current_token(tokens: &[Token], index: usize) -> Result<&Token, CompileError> {
        tokens
            .get(index)
            .or_else(|| tokens.last())
            .ok_or_else(|| error("Unexpected end of tokens", 0, 0))
    }

    fn eat(tokens: &[Token], index: &mut usize, punct: &str) -> Result<bool, CompileError> {
        if current_token(tokens, *index)?.is_punct(punct) {
            *index += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(tokens: &[Token], index: &mut usize, punct: &str) -> Result<(), CompileError> {
        if !eat(tokens, index, punct)? {
            let token = current_token(tokens, *index)?;
            return Err(error(
                &format!("Expected {} but found {}", quote(punct), describe(token)),
                token.line,
                token.column,
            ));
        }
        Ok(())
    }

    fn unexpected_token(tokens: &[Token], index: usize) -> CompileError {
        match current_token(tokens, index) {
            Ok(token) => error(
                &format!("Unexpected token {}", describe(token)),
                token.line,
                token.column,
            ),
            Err(err) => err,
        }
    }

    fn check_nesting(tokens: &[Token], index: usize, depth: usize) -> Result<(), CompileError> {
        if depth > MAX_NESTING {
            let token = current_token(tokens, index)?;
            return Err(error(
                &format!("Nesting deeper than {} levels", MAX_NESTING),
                token.line,
                token.column,
            ));
        }
        Ok(())
    }

    fn describe(token: &Token) -> String {
        if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            quote(&token.text)
        }
    }

    fn parse_expr(tokens: &[Token], index: &mut usize, depth: usize) -> Result<Expr, CompileError> {
        let token = current_token(tokens, *index)?;
        let expr = match token.kind {
            TokenKind::String => Expr::String(unescape(token)?),
            TokenKind::Number => Expr::Number(token.text.clone()),
            TokenKind::Ident if token.text == "true" => Expr::Bool(true),
            TokenKind::Ident if token.text == "false" => Expr::Bool(false),
            TokenKind::Punct if token.text == "[" => {
                check_nesting(tokens, *index, depth + 1)?;
                *index += 1;
                let mut items = Vec::new();
                while !eat(tokens, index, "]")? {
                    items.push(parse_expr(tokens, index, depth + 1)?);
                    if !eat(tokens, index, ",")? {
                        expect(tokens, index, "]")?;
                        break;
                    }
                }
                return Ok(Expr::List(items));
            }
            _ => return Err(unexpected_token(tokens, *index)),
        };
        *index += 1;
        Ok(expr)
    }

    fn parse_body(tokens: &[Token], index: &mut usize, depth: usize) -> Result<Body, CompileError> {
        let nested = depth > 0;
        let mut body = Body::default();
        loop {
            let token = current_token(tokens, *index)?;
            match token.kind {
                TokenKind::Eof if !nested => break,
                TokenKind::Punct if nested && token.text == "}" => break,
                TokenKind::Ident => {}
                _ => return Err(unexpected_token(tokens, *index)),
            }

            let name = token.text.clone();
            let (line, column) = (token.line, token.column);
            *index += 1;

            if eat(tokens, index, "=")? {
                let value = parse_expr(tokens, index, depth)?;
                body.attributes.push(Attribute { name, value, line, column });
                continue;
            }

            let mut labels = Vec::new();
            loop {
                let label = current_token(tokens, *index)?;
                match label.kind {
                    TokenKind::Ident => labels.push(label.text.clone()),
                    TokenKind::String => labels.push(unescape(label)?),
                    _ => break,
                }
                *index += 1;
            }
            check_nesting(tokens, *index, depth + 1)?;
            expect(tokens, index, "{")?;
            let inner = parse_body(tokens, index, depth + 1)?;
            expect(tokens, index, "}")?;
            body.blocks.push(Block {
                kind: name,
                labels,
                body: inner,
                line,
                column,
            });
        }
        Ok(body)
    }

    parse_body(tokens, &mut index, 0)
}

/// Strips the quotes from a string token and resolves its escapes.
fn unescape(token: &Token) -> Result<String, CompileError> {
    let raw = &token.text;
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| error(&format!("Invalid string {}", raw), token.line, token.column))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(error(
                    &format!("Invalid escape sequence \\{}", other),
                    token.line,
                    token.column,
                ))
            }
            None => return Err(error("Unterminated escape sequence", token.line, token.column)),
        }
    }
    Ok(out)
}
