//! Recursive-descent parser over the token stream.

use crate::ast::{CopySource, Statement, TriggerSpec};
use crate::lexer::{Token, TokenKind};
use crate::SyntaxError;
use sensorgraph_types::{
    Combiner, CompareOp, ConfigType, DataStream, DataStreamSelector, SlotIdentifier, StreamKind,
};

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn kind_from_word(word: &str) -> Option<StreamKind> {
    match word {
        "input" => Some(StreamKind::Input),
        "output" => Some(StreamKind::Output),
        "counter" => Some(StreamKind::Counter),
        "buffered" => Some(StreamKind::Buffered),
        "unbuffered" => Some(StreamKind::Unbuffered),
        "constant" => Some(StreamKind::Constant),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn parse_program(mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(expected: &str, token: &Token) -> SyntaxError {
        SyntaxError::Unexpected {
            expected: expected.to_string(),
            found: token.kind.describe(),
            line: token.line,
            column: token.column,
        }
    }

    fn ended(expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedEnd {
            expected: expected.to_string(),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), SyntaxError> {
        match self.next() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(Self::unexpected(expected, &token)),
            None => Err(Self::ended(expected)),
        }
    }

    fn take_ident(&mut self, expected: &str) -> Result<(String, u32, u32), SyntaxError> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Ident(word),
                line,
                column,
            }) => Ok((word, line, column)),
            Some(token) => Err(Self::unexpected(expected, &token)),
            None => Err(Self::ended(expected)),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), SyntaxError> {
        let expected = format!("'{word}'");
        let (found, line, column) = self.take_ident(&expected)?;
        if found == word {
            Ok(())
        } else {
            Err(SyntaxError::Unexpected {
                expected,
                found: format!("'{found}'"),
                line,
                column,
            })
        }
    }

    fn take_number(&mut self, expected: &str) -> Result<(u32, u32, u32), SyntaxError> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Number(value),
                line,
                column,
            }) => Ok((value, line, column)),
            Some(token) => Err(Self::unexpected(expected, &token)),
            None => Err(Self::ended(expected)),
        }
    }

    fn take_u16(&mut self, expected: &str) -> Result<u16, SyntaxError> {
        let (value, line, column) = self.take_number(expected)?;
        u16::try_from(value).map_err(|_| SyntaxError::InvalidNumber {
            text: value.to_string(),
            line,
            column,
        })
    }

    fn take_u8(&mut self, expected: &str) -> Result<u8, SyntaxError> {
        let (value, line, column) = self.take_number(expected)?;
        u8::try_from(value).map_err(|_| SyntaxError::InvalidNumber {
            text: value.to_string(),
            line,
            column,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let (word, line, column) = self.take_ident("a statement")?;
        match word.as_str() {
            "every" => self.parse_every(),
            "when" => self.parse_when(),
            "on" => self.parse_on(),
            "copy" => self.parse_copy(),
            "count" => {
                self.expect(TokenKind::Arrow, "'=>'")?;
                let dest = self.parse_stream()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Statement::Count { dest })
            }
            "average" => {
                self.expect(TokenKind::Arrow, "'=>'")?;
                let dest = self.parse_stream()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Statement::Average { dest })
            }
            "call" => self.parse_call(),
            "config" => self.parse_config(),
            "streamer" => self.parse_streamer(),
            other => Err(SyntaxError::Unexpected {
                expected: "a statement".to_string(),
                found: format!("'{other}'"),
                line,
                column,
            }),
        }
    }

    fn parse_every(&mut self) -> Result<Statement, SyntaxError> {
        let (count, line, column) = self.take_number("an interval")?;
        let (unit, unit_line, unit_column) = self.take_ident("a time unit")?;
        let unit_seconds = match unit.as_str() {
            "second" | "seconds" => 1,
            "minute" | "minutes" => 60,
            "hour" | "hours" => 3600,
            "day" | "days" => 86400,
            other => {
                return Err(SyntaxError::Unexpected {
                    expected: "a time unit".to_string(),
                    found: format!("'{other}'"),
                    line: unit_line,
                    column: unit_column,
                })
            }
        };
        let interval_seconds =
            count
                .checked_mul(unit_seconds)
                .ok_or_else(|| SyntaxError::InvalidNumber {
                    text: count.to_string(),
                    line,
                    column,
                })?;
        let body = self.parse_block()?;
        Ok(Statement::Every {
            interval_seconds,
            body,
        })
    }

    fn parse_when(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword("connected")?;
        self.expect_keyword("to")?;
        let slot = self.parse_slot()?;
        let body = self.parse_block()?;
        Ok(Statement::WhenConnected { slot, body })
    }

    fn parse_on(&mut self) -> Result<Statement, SyntaxError> {
        // `on connect { }` and `on disconnect { }` are keyword forms, only
        // distinguishable from a trigger by the brace that follows.
        if let (Some(TokenKind::Ident(word)), Some(TokenKind::LBrace)) = (
            self.peek().map(|t| &t.kind),
            self.peek_at(1).map(|t| &t.kind),
        ) {
            match word.as_str() {
                "connect" => {
                    self.next();
                    let body = self.parse_block()?;
                    return Ok(Statement::OnConnect { body });
                }
                "disconnect" => {
                    self.next();
                    let body = self.parse_block()?;
                    return Ok(Statement::OnDisconnect { body });
                }
                _ => {}
            }
        }

        let trigger = self.parse_trigger()?;
        let body = self.parse_block()?;
        Ok(Statement::OnTrigger { trigger, body })
    }

    fn parse_copy(&mut self) -> Result<Statement, SyntaxError> {
        let source = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Arrow) => CopySource::Implicit,
            Some(TokenKind::Number(value)) => {
                let value = *value;
                self.next();
                CopySource::Literal(value)
            }
            _ => CopySource::Stream(self.parse_stream()?),
        };
        self.expect(TokenKind::Arrow, "'=>'")?;
        let dest = self.parse_stream()?;
        self.expect(TokenKind::Semi, "';'")?;
        Ok(Statement::Copy { source, dest })
    }

    fn parse_call(&mut self) -> Result<Statement, SyntaxError> {
        let rpc_id = self.take_u16("an RPC id")?;
        self.expect_keyword("on")?;
        let slot = self.parse_slot()?;
        self.expect(TokenKind::Arrow, "'=>'")?;
        let dest = self.parse_stream()?;
        self.expect(TokenKind::Semi, "';'")?;
        Ok(Statement::Call { rpc_id, slot, dest })
    }

    fn parse_config(&mut self) -> Result<Statement, SyntaxError> {
        let slot = self.parse_slot()?;
        let key = self.take_u16("a config key")?;
        self.expect(TokenKind::Assign, "'='")?;
        let (type_word, line, column) = self.take_ident("a config type")?;
        let ty: ConfigType = type_word.parse().map_err(|_| SyntaxError::Unexpected {
            expected: "a config type".to_string(),
            found: format!("'{type_word}'"),
            line,
            column,
        })?;
        let (value, _, _) = self.take_number("a config value")?;
        self.expect(TokenKind::Semi, "';'")?;
        Ok(Statement::Config {
            slot,
            key,
            ty,
            value,
        })
    }

    fn parse_streamer(&mut self) -> Result<Statement, SyntaxError> {
        let selector = self.parse_selector()?;
        self.expect(TokenKind::Arrow, "'=>'")?;
        let dest = self.parse_slot()?;
        let with_other = if matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Ident(word)) if word == "with_other"
        ) {
            self.next();
            Some(self.take_u8("a streamer index")?)
        } else {
            None
        };
        self.expect(TokenKind::Semi, "';'")?;
        Ok(Statement::Streamer {
            selector,
            dest,
            with_other,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::RBrace => {
                    self.next();
                    return Ok(body);
                }
                Some(_) => body.push(self.parse_statement()?),
                None => return Err(Self::ended("'}'")),
            }
        }
    }

    fn parse_trigger(&mut self) -> Result<TriggerSpec, SyntaxError> {
        let left = self.parse_trigger_primary()?;
        let combiner = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(word)) if word == "and" => Combiner::And,
            Some(TokenKind::Ident(word)) if word == "or" => Combiner::Or,
            _ => return Ok(left),
        };
        self.next();
        let right = self.parse_trigger()?;
        Ok(TriggerSpec::Combined {
            left: Box::new(left),
            combiner,
            right: Box::new(right),
        })
    }

    fn parse_trigger_primary(&mut self) -> Result<TriggerSpec, SyntaxError> {
        if let (Some(TokenKind::Ident(word)), Some(TokenKind::LParen)) = (
            self.peek().map(|t| &t.kind),
            self.peek_at(1).map(|t| &t.kind),
        ) {
            let is_count = match word.as_str() {
                "count" => Some(true),
                "value" => Some(false),
                _ => None,
            };
            if let Some(is_count) = is_count {
                self.next();
                self.next();
                let stream = self.parse_stream()?;
                self.expect(TokenKind::RParen, "')'")?;
                let op = self.parse_compare_op()?;
                let (value, _, _) = self.take_number("a comparison value")?;
                return Ok(if is_count {
                    TriggerSpec::Count { stream, op, value }
                } else {
                    TriggerSpec::Value { stream, op, value }
                });
            }
        }
        Ok(TriggerSpec::Stream(self.parse_stream()?))
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, SyntaxError> {
        match self.next() {
            Some(token) => match token.kind {
                TokenKind::EqEq => Ok(CompareOp::Eq),
                TokenKind::Gt => Ok(CompareOp::Gt),
                TokenKind::Lt => Ok(CompareOp::Lt),
                TokenKind::Ge => Ok(CompareOp::Ge),
                TokenKind::Le => Ok(CompareOp::Le),
                _ => Err(Self::unexpected("a comparison operator", &token)),
            },
            None => Err(Self::ended("a comparison operator")),
        }
    }

    fn parse_stream(&mut self) -> Result<DataStream, SyntaxError> {
        let (word, line, column) = self.take_ident("a stream kind")?;
        let kind = if word == "system" {
            self.expect_keyword("input")?;
            StreamKind::System
        } else {
            kind_from_word(&word).ok_or(SyntaxError::Unexpected {
                expected: "a stream kind".to_string(),
                found: format!("'{word}'"),
                line,
                column,
            })?
        };
        let id = self.take_u16("a stream id")?;
        Ok(DataStream { kind, id })
    }

    fn parse_selector(&mut self) -> Result<DataStreamSelector, SyntaxError> {
        let is_all = matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Ident(word)) if word == "all"
        );
        if !is_all {
            return Ok(DataStreamSelector::exact(self.parse_stream()?));
        }
        self.next();
        let (word, line, column) = self.take_ident("a stream class")?;
        let kind = if word == "system" {
            let (next, next_line, next_column) = self.take_ident("'inputs'")?;
            if next == "inputs" || next == "input" {
                StreamKind::System
            } else {
                return Err(SyntaxError::Unexpected {
                    expected: "'inputs'".to_string(),
                    found: format!("'{next}'"),
                    line: next_line,
                    column: next_column,
                });
            }
        } else {
            kind_from_word(&word)
                .or_else(|| kind_from_word(word.trim_end_matches('s')))
                .ok_or(SyntaxError::Unexpected {
                    expected: "a stream class".to_string(),
                    found: format!("'{word}'"),
                    line,
                    column,
                })?
        };
        Ok(DataStreamSelector::all(kind))
    }

    fn parse_slot(&mut self) -> Result<SlotIdentifier, SyntaxError> {
        let (word, line, column) = self.take_ident("a slot")?;
        match word.as_str() {
            "controller" => Ok(SlotIdentifier::Controller),
            "slot" => Ok(SlotIdentifier::Slot(self.take_u8("a slot number")?)),
            other => Err(SyntaxError::Unexpected {
                expected: "a slot".to_string(),
                found: format!("'{other}'"),
                line,
                column,
            }),
        }
    }
}
