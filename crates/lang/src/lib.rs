//! Parser for the SensorGraph source language.
//!
//! Parsing is a pure function from UTF-8 source text to an ordered sequence
//! of [`Statement`]s; it never touches a graph and has no side effects beyond
//! producing statements or a [`SyntaxError`] carrying line and column.
//!
//! # Surface syntax
//!
//! - `#` starts a comment that runs to end of line; whitespace is free-form.
//! - Simple statements end with `;`, blocks use `{ }`.
//! - `every <n> <unit> { <body> }` with units `second(s)`, `minute(s)`,
//!   `hour(s)`, `day(s)`.
//! - `when connected to <slot> { <body> }`, whose body may contain
//!   `on connect { … }` and `on disconnect { … }` sub-blocks.
//! - `on <trigger> { <body> }` where a trigger is a bare stream (fires on
//!   every update), `count(<stream>) <op> <n>`, `value(<stream>) <op> <n>`,
//!   or a chain joined with `and` / `or` (right-associative). `<op>` is one
//!   of `==`, `>`, `<`, `>=`, `<=`.
//! - Body statements: `copy [<stream>|<literal>] => <stream>;`,
//!   `count => <stream>;`, `average => <stream>;`,
//!   `call <rpc> on <slot> => <stream>;`.
//! - `config <slot> <key> = <type> <value>;`
//! - `streamer <selector> => <slot> [with_other <n>];`
//!
//! The parser accepts any structurally valid nesting; combinations the
//! dataflow graph cannot express are rejected later, at compile time.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{CopySource, Statement, TriggerSpec};
pub use error::SyntaxError;

/// Parse SensorGraph source text into an ordered sequence of statements.
pub fn parse(source: &str) -> Result<Vec<Statement>, SyntaxError> {
    let tokens = lexer::lex(source)?;
    parser::Parser::new(tokens).parse_program()
}
