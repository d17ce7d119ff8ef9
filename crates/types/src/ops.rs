//! Comparison and combination operators shared by triggers and the AST.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary comparison used by count and value triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    /// Apply the comparison with `left` as the observed quantity.
    pub fn evaluate(&self, left: u32, right: u32) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Gt => left > right,
            Self::Lt => left < right,
            Self::Ge => left >= right,
            Self::Le => left <= right,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Eq => "==",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        };
        f.write_str(text)
    }
}

impl FromStr for CompareOp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Eq),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            other => Err(ParseError::Unrecognized {
                text: other.to_string(),
            }),
        }
    }
}

/// How a node's two trigger inputs combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combiner {
    And,
    Or,
}

impl fmt::Display for Combiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "&&",
            Self::Or => "||",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons() {
        assert!(CompareOp::Ge.evaluate(60, 60));
        assert!(!CompareOp::Gt.evaluate(60, 60));
        assert!(CompareOp::Eq.evaluate(5, 5));
        assert!(CompareOp::Le.evaluate(4, 5));
        assert!(CompareOp::Lt.evaluate(4, 5));
    }

    #[test]
    fn parse_ops() {
        assert_eq!(">=".parse::<CompareOp>().unwrap(), CompareOp::Ge);
        assert!("=>".parse::<CompareOp>().is_err());
    }
}
