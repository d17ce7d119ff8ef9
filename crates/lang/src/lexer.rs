//! Hand-rolled lexer with line/column tracking.

use crate::SyntaxError;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(u32),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
    /// `=>`
    Arrow,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl TokenKind {
    /// Human-readable rendering for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(word) => format!("'{word}'"),
            Self::Number(n) => format!("'{n}'"),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Semi => "';'".to_string(),
            Self::Arrow => "'=>'".to_string(),
            Self::Assign => "'='".to_string(),
            Self::EqEq => "'=='".to_string(),
            Self::Gt => "'>'".to_string(),
            Self::Lt => "'<'".to_string(),
            Self::Ge => "'>='".to_string(),
            Self::Le => "'<='".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: u32,
    pub(crate) column: u32,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn token(&self, kind: TokenKind, line: u32, column: u32) -> Token {
        Token { kind, line, column }
    }
}

pub(crate) fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(&c) = lexer.chars.peek() {
        let (line, column) = (lexer.line, lexer.column);

        if c.is_whitespace() {
            lexer.bump();
            continue;
        }
        if c == '#' {
            while let Some(&c) = lexer.chars.peek() {
                if c == '\n' {
                    break;
                }
                lexer.bump();
            }
            continue;
        }

        if c.is_ascii_digit() {
            let mut text = String::new();
            while let Some(&c) = lexer.chars.peek() {
                if c.is_ascii_alphanumeric() {
                    text.push(c);
                    lexer.bump();
                } else {
                    break;
                }
            }
            let value = parse_number(&text).ok_or_else(|| SyntaxError::InvalidNumber {
                text: text.clone(),
                line,
                column,
            })?;
            tokens.push(lexer.token(TokenKind::Number(value), line, column));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = lexer.chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    word.push(c);
                    lexer.bump();
                } else {
                    break;
                }
            }
            tokens.push(lexer.token(TokenKind::Ident(word), line, column));
            continue;
        }

        lexer.bump();
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ';' => TokenKind::Semi,
            '=' => match lexer.chars.peek() {
                Some('>') => {
                    lexer.bump();
                    TokenKind::Arrow
                }
                Some('=') => {
                    lexer.bump();
                    TokenKind::EqEq
                }
                _ => TokenKind::Assign,
            },
            '>' => {
                if lexer.chars.peek() == Some(&'=') {
                    lexer.bump();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '<' => {
                if lexer.chars.peek() == Some(&'=') {
                    lexer.bump();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            other => {
                return Err(SyntaxError::UnexpectedCharacter {
                    found: other,
                    line,
                    column,
                })
            }
        };
        tokens.push(lexer.token(kind, line, column));
    }

    Ok(tokens)
}

fn parse_number(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}
