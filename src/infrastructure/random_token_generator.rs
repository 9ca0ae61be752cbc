use rand_core::{OsRng, TryRngCore};

use crate::domain::{
    error::DomainError,
    services::token_service::{Token, TokenGenerator},
};

const TOKEN_BYTES: usize = 20;

/// Confirmation tokens are raw OS randomness, hex-encoded. Nothing else
/// in the system can derive or predict one.
#[derive(Clone)]
pub struct RandomTokenGenerator;

impl RandomTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn new_token(&self) -> Result<Token, DomainError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::TokenGeneration(e.to_string()))?;
        Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }
}
