//! Tokenizer for the supported source subset
//!
//! Produces a flat token stream with line numbers for diagnostics. Keywords
//! come out as plain identifiers; the parser matches them by text, which
//! keeps the token enum small.

use crate::error::{MutationError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    CharLit(char),
    StrLit(String),

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Le,
    Gt,
    Ge,
    AmpAmp,
    PipePipe,
    Amp,
    Pipe,
    Caret,
    Tilde,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

pub fn tokenize(source: &str, file_name: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line = 1;

    let err = |line: usize, message: String| MutationError::Parse {
        file: file_name.to_string(),
        line,
        message,
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                loop {
                    if i + 1 >= chars.len() {
                        return Err(err(line, "unterminated block comment".into()));
                    }
                    if chars[i] == '*' && chars[i + 1] == '/' {
                        i += 2;
                        break;
                    }
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Ident(text),
                    line,
                });
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let is_float = chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                if is_float {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                // trailing type suffixes are accepted and dropped
                if matches!(chars.get(i), Some('l' | 'L' | 'f' | 'F' | 'd' | 'D')) {
                    let suffix = chars[i];
                    let text: String = chars[start..i].iter().collect();
                    i += 1;
                    let kind = if is_float || matches!(suffix, 'f' | 'F' | 'd' | 'D') {
                        TokenKind::FloatLit(
                            text.parse()
                                .map_err(|e| err(line, format!("bad number {:?}: {}", text, e)))?,
                        )
                    } else {
                        TokenKind::IntLit(
                            text.parse()
                                .map_err(|e| err(line, format!("bad number {:?}: {}", text, e)))?,
                        )
                    };
                    tokens.push(Token { kind, line });
                } else {
                    let text: String = chars[start..i].iter().collect();
                    let kind = if is_float {
                        TokenKind::FloatLit(
                            text.parse()
                                .map_err(|e| err(line, format!("bad number {:?}: {}", text, e)))?,
                        )
                    } else {
                        TokenKind::IntLit(
                            text.parse()
                                .map_err(|e| err(line, format!("bad number {:?}: {}", text, e)))?,
                        )
                    };
                    tokens.push(Token { kind, line });
                }
            }
            '\'' => {
                i += 1;
                let ch = match chars.get(i) {
                    Some('\\') => {
                        i += 1;
                        match chars.get(i) {
                            Some('n') => '\n',
                            Some('t') => '\t',
                            Some('r') => '\r',
                            Some('0') => '\0',
                            Some('\\') => '\\',
                            Some('\'') => '\'',
                            Some(other) => *other,
                            None => return Err(err(line, "unterminated char literal".into())),
                        }
                    }
                    Some(c) => *c,
                    None => return Err(err(line, "unterminated char literal".into())),
                };
                i += 1;
                if chars.get(i) != Some(&'\'') {
                    return Err(err(line, "unterminated char literal".into()));
                }
                i += 1;
                tokens.push(Token {
                    kind: TokenKind::CharLit(ch),
                    line,
                });
            }
            '"' => {
                i += 1;
                let mut text = String::new();
                loop {
                    match chars.get(i) {
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            i += 1;
                            match chars.get(i) {
                                Some('n') => text.push('\n'),
                                Some('t') => text.push('\t'),
                                Some('"') => text.push('"'),
                                Some('\\') => text.push('\\'),
                                Some(other) => text.push(*other),
                                None => {
                                    return Err(err(line, "unterminated string literal".into()))
                                }
                            }
                            i += 1;
                        }
                        Some('\n') | None => {
                            return Err(err(line, "unterminated string literal".into()))
                        }
                        Some(c) => {
                            text.push(*c);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::StrLit(text),
                    line,
                });
            }
            _ => {
                let two: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let (kind, len) = match two.as_str() {
                    "++" => (TokenKind::PlusPlus, 2),
                    "--" => (TokenKind::MinusMinus, 2),
                    "+=" => (TokenKind::PlusEq, 2),
                    "-=" => (TokenKind::MinusEq, 2),
                    "*=" => (TokenKind::StarEq, 2),
                    "/=" => (TokenKind::SlashEq, 2),
                    "%=" => (TokenKind::PercentEq, 2),
                    "==" => (TokenKind::EqEq, 2),
                    "!=" => (TokenKind::BangEq, 2),
                    "<=" => (TokenKind::Le, 2),
                    ">=" => (TokenKind::Ge, 2),
                    "&&" => (TokenKind::AmpAmp, 2),
                    "||" => (TokenKind::PipePipe, 2),
                    _ => match c {
                        '(' => (TokenKind::LParen, 1),
                        ')' => (TokenKind::RParen, 1),
                        '{' => (TokenKind::LBrace, 1),
                        '}' => (TokenKind::RBrace, 1),
                        '[' => (TokenKind::LBracket, 1),
                        ']' => (TokenKind::RBracket, 1),
                        ';' => (TokenKind::Semi, 1),
                        ',' => (TokenKind::Comma, 1),
                        '.' => (TokenKind::Dot, 1),
                        '+' => (TokenKind::Plus, 1),
                        '-' => (TokenKind::Minus, 1),
                        '*' => (TokenKind::Star, 1),
                        '/' => (TokenKind::Slash, 1),
                        '%' => (TokenKind::Percent, 1),
                        '=' => (TokenKind::Eq, 1),
                        '!' => (TokenKind::Bang, 1),
                        '<' => (TokenKind::Lt, 1),
                        '>' => (TokenKind::Gt, 1),
                        '&' => (TokenKind::Amp, 1),
                        '|' => (TokenKind::Pipe, 1),
                        '^' => (TokenKind::Caret, 1),
                        '~' => (TokenKind::Tilde, 1),
                        other => {
                            return Err(err(line, format!("unexpected character {:?}", other)))
                        }
                    },
                };
                tokens.push(Token { kind, line });
                i += len;
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, "t.java")
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn splits_compound_operators() {
        assert_eq!(
            kinds("x += 1; y++ <= z"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::PlusEq,
                TokenKind::IntLit(1),
                TokenKind::Semi,
                TokenKind::Ident("y".into()),
                TokenKind::PlusPlus,
                TokenKind::Le,
                TokenKind::Ident("z".into()),
            ]
        );
    }

    #[test]
    fn skips_comments_and_counts_lines() {
        let toks = tokenize("// header\nint x; /* a\nb */ x", "t.java").unwrap();
        assert_eq!(toks[0].line, 2);
        assert_eq!(toks.last().unwrap().line, 3);
    }

    #[test]
    fn literal_suffixes_are_dropped() {
        assert_eq!(
            kinds("10L 2.5f"),
            vec![TokenKind::IntLit(10), TokenKind::FloatLit(2.5)]
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        let e = tokenize("\"abc", "t.java").unwrap_err();
        assert!(e.to_string().contains("unterminated"));
    }
}
