use thiserror::Error;

/// Contract errors surfaced to the caller before any process is launched.
///
/// A failing editor process is not an error here: it comes back as an
/// `ExecutionResult` with `Status::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid request field `{field}`: {reason}")]
    SchemaViolation { field: String, reason: String },

    #[error("`{action} {sub_action}` requires a `target`")]
    MissingTarget {
        action: &'static str,
        sub_action: &'static str,
    },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl DispatchError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
