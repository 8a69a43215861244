#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid image path: {0}")]
    InvalidImagePath(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}
