/// Convenience result type used across stagehand.
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Boxed lower-level cause attached to a stagehand error.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error taxonomy.
///
/// Every variant aborts the pass that raised it. Non-fatal diagnostics are reported as
/// [`crate::Warning`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum StagehandError {
    /// Malformed documents, I/O failures and malformed composite keys.
    #[error("load error: {message}")]
    Load {
        /// Human readable description.
        message: String,
        /// Underlying cause, when the failure wraps a lower-level fault.
        #[source]
        source: Option<Cause>,
    },

    /// Registry and construction failures: duplicate or unknown names, missing values,
    /// unsupported directives, failed constructors.
    #[error("object error: {message}")]
    Object {
        /// Human readable description.
        message: String,
        /// Underlying cause, when the failure wraps a lower-level fault.
        #[source]
        source: Option<Cause>,
    },

    /// Action script failures found while compiling or playing.
    #[error("execution error: {message}")]
    Execution {
        /// Human readable description.
        message: String,
        /// Underlying cause, when the failure wraps a lower-level fault.
        #[source]
        source: Option<Cause>,
    },

    /// Wrapped lower-level error from renderer implementations or dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StagehandError {
    /// Build a [`StagehandError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load {
            message: msg.into(),
            source: None,
        }
    }

    /// Build a [`StagehandError::Load`] value carrying its cause.
    pub fn load_with(msg: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Load {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Build a [`StagehandError::Object`] value.
    pub fn object(msg: impl Into<String>) -> Self {
        Self::Object {
            message: msg.into(),
            source: None,
        }
    }

    /// Build a [`StagehandError::Object`] value carrying its cause.
    pub fn object_with(msg: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Object {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// Build a [`StagehandError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
            source: None,
        }
    }

    /// Build a [`StagehandError::Execution`] value carrying its cause.
    pub fn execution_with(msg: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Execution {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    /// `true` for [`StagehandError::Load`].
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// `true` for [`StagehandError::Object`].
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }

    /// `true` for [`StagehandError::Execution`].
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
