//! Condition lexer — tokenizes a condition source string.

use crate::error::CompileError;

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Token kinds of the condition language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier, possibly dotted (`count`, `properties.name`).
    Ident(String),
    /// Integer literal (no dot in the lexeme).
    Int(i64),
    /// Float literal (one dot in the lexeme).
    Float(f64),
    /// Double-quoted string literal, no escapes.
    Str(String),
    /// `true` or `false`.
    Bool(bool),

    AndAnd,
    OrOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Bang,
    LParen,
    RParen,

    Eof,
}

impl TokenKind {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => s.clone(),
            TokenKind::Int(n) => n.to_string(),
            TokenKind::Float(f) => f.to_string(),
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::Bool(b) => b.to_string(),
            TokenKind::AndAnd => "&&".into(),
            TokenKind::OrOr => "||".into(),
            TokenKind::Eq => "==".into(),
            TokenKind::Ne => "!=".into(),
            TokenKind::Lt => "<".into(),
            TokenKind::Le => "<=".into(),
            TokenKind::Gt => ">".into(),
            TokenKind::Ge => ">=".into(),
            TokenKind::Bang => "!".into(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// Tokenize a condition string. The result always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                let text = &input[start..i];
                let kind = match text {
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    _ => TokenKind::Ident(text.to_string()),
                };
                tokens.push(Token { kind, pos: start });
            }

            b'0'..=b'9' => {
                let token = lex_number(input, &mut i)?;
                tokens.push(token);
            }

            // A '-' starts a negative number literal when a digit follows
            // immediately; the grammar has no infix minus.
            b'-' if i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() => {
                let token = lex_number(input, &mut i)?;
                tokens.push(token);
            }

            b'"' => {
                let start = i;
                i += 1;
                let body_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(CompileError::UnterminatedString { pos: start });
                }
                let text = input[body_start..i].to_string();
                i += 1;
                tokens.push(Token {
                    kind: TokenKind::Str(text),
                    pos: start,
                });
            }

            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                tokens.push(Token { kind: TokenKind::AndAnd, pos: i });
                i += 2;
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                tokens.push(Token { kind: TokenKind::OrOr, pos: i });
                i += 2;
            }
            b'=' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token { kind: TokenKind::Eq, pos: i });
                i += 2;
            }
            b'!' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token { kind: TokenKind::Ne, pos: i });
                i += 2;
            }
            b'<' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token { kind: TokenKind::Le, pos: i });
                i += 2;
            }
            b'>' if bytes.get(i + 1) == Some(&b'=') => {
                tokens.push(Token { kind: TokenKind::Ge, pos: i });
                i += 2;
            }
            b'<' => {
                tokens.push(Token { kind: TokenKind::Lt, pos: i });
                i += 1;
            }
            b'>' => {
                tokens.push(Token { kind: TokenKind::Gt, pos: i });
                i += 1;
            }
            b'!' => {
                tokens.push(Token { kind: TokenKind::Bang, pos: i });
                i += 1;
            }
            b'(' => {
                tokens.push(Token { kind: TokenKind::LParen, pos: i });
                i += 1;
            }
            b')' => {
                tokens.push(Token { kind: TokenKind::RParen, pos: i });
                i += 1;
            }

            _ => {
                // Report the full character, not the leading byte.
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(CompileError::UnexpectedChar { ch, pos: i });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

/// Lex a number starting at `*i` (optionally signed, at most one dot).
/// Advances `*i` past the lexeme.
fn lex_number(input: &str, i: &mut usize) -> Result<Token, CompileError> {
    let bytes = input.as_bytes();
    let start = *i;
    if bytes[*i] == b'-' {
        *i += 1;
    }
    let mut seen_dot = false;
    while *i < bytes.len() {
        match bytes[*i] {
            b'0'..=b'9' => *i += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                *i += 1;
            }
            _ => break,
        }
    }
    let text = &input[start..*i];
    let kind = if seen_dot {
        let f = text.parse::<f64>().map_err(|_| CompileError::BadNumber {
            pos: start,
            text: text.to_string(),
        })?;
        TokenKind::Float(f)
    } else {
        let n = text.parse::<i64>().map_err(|_| CompileError::BadNumber {
            pos: start,
            text: text.to_string(),
        })?;
        TokenKind::Int(n)
    };
    Ok(Token { kind, pos: start })
}
