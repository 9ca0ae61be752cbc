use crate::domain::{error::DomainError, models::credential::HashedPassword};

/// Service for hashing passwords before they are persisted. Strength
/// rules live in the validation pass, not here.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError>;
}
