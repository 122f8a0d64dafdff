/// Errors raised while constructing a [`BulkAction`](crate::models::bulk::BulkAction).
///
/// Encoding has no failure path, so this is the whole error surface of the library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("unknown bulk operation: {0:?} (expected index, create, update or delete)")]
    UnknownOperation(String),
}

pub type Result<T> = core::result::Result<T, ActionError>;
