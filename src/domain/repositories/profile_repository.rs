use async_trait::async_trait;

use crate::domain::{error::RepositoryError, models::profile::UserProfile};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError>;
}
