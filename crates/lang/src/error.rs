use thiserror::Error;

/// Malformed source text, carrying the position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A character outside the language's alphabet.
    #[error("line {line}, column {column}: unexpected character '{found}'")]
    UnexpectedCharacter { found: char, line: u32, column: u32 },

    /// A numeric literal that does not fit the expected range or radix.
    #[error("line {line}, column {column}: invalid number '{text}'")]
    InvalidNumber {
        text: String,
        line: u32,
        column: u32,
    },

    /// The parser expected one construct and found another.
    #[error("line {line}, column {column}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    /// Source ended mid-statement.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEnd { expected: String },
}
