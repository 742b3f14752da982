#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A business rule forbids the requested mutation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The caller does not own the resource it is trying to change.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No usable caller identity was presented.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored aggregate violates its own invariants.
    #[error("Illegal state: {0}")]
    IllegalState(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
