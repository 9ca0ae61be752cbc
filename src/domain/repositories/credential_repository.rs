use async_trait::async_trait;

use crate::domain::{error::RepositoryError, models::credential::UserCredential};

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredential>, RepositoryError>;
}
