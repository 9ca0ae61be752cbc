use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{
        credential::{HashedPassword, UserCredential},
        profile::UserProfile,
    },
};

/// Repository for account creation that writes the credential and its
/// profile atomically. The credential row goes in first (inactive) and
/// the profile row references its id; if either insert fails, neither
/// row survives.
#[async_trait]
pub trait AccountRegistrationRepository: Send + Sync {
    async fn create_account(
        &self,
        username: &str,
        password_hash: HashedPassword,
        email: &str,
        firstname: &str,
        lastname: &str,
        validate_token: &str,
    ) -> Result<(UserCredential, UserProfile), RepositoryError>;
}
