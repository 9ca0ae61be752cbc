use std::time::Duration;

use async_trait::async_trait;
use entity::credentials;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::{
    error::RepositoryError,
    models::credential::{HashedPassword, UserCredential},
    repositories::credential_repository::CredentialRepository,
};

#[derive(Clone)]
pub struct PostgresCredentialRepository {
    db: DatabaseConnection,
    query_timeout: Duration,
}

impl PostgresCredentialRepository {
    pub fn new(db: DatabaseConnection, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredential>, RepositoryError> {
        let found = tokio::time::timeout(
            self.query_timeout,
            credentials::Entity::find()
                .filter(credentials::Column::Username.eq(username))
                .one(&self.db),
        )
        .await
        .map_err(|_| RepositoryError::Timeout)?
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(found.map(|model| {
            UserCredential::reconstruct(
                model.id,
                model.username,
                HashedPassword::new(model.password_hash),
                model.is_active,
                model.created_at.naive_utc().and_utc(),
                model.updated_at.naive_utc().and_utc(),
            )
        }))
    }
}
