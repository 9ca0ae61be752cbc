use thiserror::Error;

use crate::domain::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("registration input rejected")]
    Validation(ValidationErrors),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    DatabaseError(String),
}
