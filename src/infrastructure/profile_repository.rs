use std::time::Duration;

use async_trait::async_trait;
use entity::profiles;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::{
    error::RepositoryError, models::profile::UserProfile,
    repositories::profile_repository::ProfileRepository,
};

#[derive(Clone)]
pub struct PostgresProfileRepository {
    db: DatabaseConnection,
    query_timeout: Duration,
}

impl PostgresProfileRepository {
    pub fn new(db: DatabaseConnection, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let found = tokio::time::timeout(
            self.query_timeout,
            profiles::Entity::find()
                .filter(profiles::Column::Email.eq(email))
                .one(&self.db),
        )
        .await
        .map_err(|_| RepositoryError::Timeout)?
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(found.map(|model| {
            UserProfile::reconstruct(
                model.id,
                model.user_id,
                model.email,
                model.firstname,
                model.lastname,
                model.validate_token,
                model.created_at.naive_utc().and_utc(),
                model.updated_at.naive_utc().and_utc(),
            )
        }))
    }
}
