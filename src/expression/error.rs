use std::fmt;

/// Failure while parsing or evaluating a data-embedded expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError {
    /// Byte offset into the source for parse errors.
    pub offset: Option<usize>,
    /// Human readable description.
    pub message: String,
}

impl ExprError {
    pub(crate) fn at(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset: Some(offset),
            message: message.into(),
        }
    }

    pub(crate) fn eval(message: impl Into<String>) -> Self {
        Self {
            offset: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "expr error at byte {offset}: {}", self.message),
            None => write!(f, "expr error: {}", self.message),
        }
    }
}

impl std::error::Error for ExprError {}
