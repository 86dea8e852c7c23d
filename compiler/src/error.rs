use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error at line {line}, column {column}: {msg}")]
    Syntax {
        msg:    String,
        line:   usize,
        column: usize,
    },

    /// An illegal or duplicate identifier.
    #[error("{0}")]
    Name(String),

    /// A model, enum or map value that does not resolve to a known name.
    #[error("{0}")]
    Reference(String),

    /// A validator that is internally inconsistent, or a default that
    /// violates its own validators.
    #[error("{0}")]
    Constraint(String),

    #[error("{0}")]
    AccessorPolicy(String),

    #[error("unknown schema version {0:?}")]
    Version(String),

    #[error("Generation error: {0}")]
    Generation(String),
}

impl CompileError {
    /// Position of a syntax error, if the error carries one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            CompileError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
