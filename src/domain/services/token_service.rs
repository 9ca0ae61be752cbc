use crate::domain::error::DomainError;

pub type Token = String;

/// Produces the opaque, unguessable token stored on a new profile. The
/// email confirmation flow presents the same token back to activate the
/// account.
pub trait TokenGenerator: Send + Sync {
    fn new_token(&self) -> Result<Token, DomainError>;
}
