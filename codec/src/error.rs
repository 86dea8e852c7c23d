use thiserror::Error;

use crate::kind::Kind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    #[error("expected {expected} but found kind tag {found}")]
    InvalidKind {
        expected: Kind,
        found:    u8,
    },

    #[error("unknown kind tag {0}")]
    UnknownKind(u8),

    #[error("invalid bool byte {0}")]
    InvalidBool(u8),

    #[error("varint does not fit in {0} bits")]
    VarintOverflow(u8),

    #[error("string value is not valid UTF-8")]
    InvalidUtf8,

    #[error("a value of kind {0} cannot appear on its own")]
    Unskippable(Kind),

    #[error("values are nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Raised by generated setters when a value violates one of the field's
/// validators. The receiver is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        ValidationError(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
