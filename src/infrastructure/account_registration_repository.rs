use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use entity::{credentials, profiles};
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::domain::{
    error::RepositoryError,
    models::{
        credential::{HashedPassword, UserCredential},
        profile::UserProfile,
    },
    repositories::account_registration_repository::AccountRegistrationRepository,
};

#[derive(Clone)]
pub struct PostgresAccountRegistrationRepository {
    db: DatabaseConnection,
    query_timeout: Duration,
}

impl PostgresAccountRegistrationRepository {
    pub fn new(db: DatabaseConnection, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }
}

#[async_trait]
impl AccountRegistrationRepository for PostgresAccountRegistrationRepository {
    async fn create_account(
        &self,
        username: &str,
        password_hash: HashedPassword,
        email: &str,
        firstname: &str,
        lastname: &str,
        validate_token: &str,
    ) -> Result<(UserCredential, UserProfile), RepositoryError> {
        // An uncommitted transaction rolls back when dropped, so both the
        // error paths and the timeout path leave no rows behind.
        let writes = async {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            let now = Utc::now();
            let credential_id = Uuid::new_v4();

            let credential_model = credentials::ActiveModel {
                id: Set(credential_id),
                username: Set(username.to_string()),
                password_hash: Set(password_hash.as_str().to_string()),
                is_active: Set(false),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
            };

            credentials::Entity::insert(credential_model)
                .exec(&txn)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            let profile_id = Uuid::new_v4();
            let profile_model = profiles::ActiveModel {
                id: Set(profile_id),
                user_id: Set(credential_id),
                email: Set(email.to_string()),
                firstname: Set(firstname.to_string()),
                lastname: Set(lastname.to_string()),
                validate_token: Set(validate_token.to_string()),
                created_at: Set(now.fixed_offset()),
                updated_at: Set(now.fixed_offset()),
            };

            profiles::Entity::insert(profile_model)
                .exec(&txn)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            txn.commit()
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            let credential = UserCredential::reconstruct(
                credential_id,
                username.to_string(),
                password_hash,
                false,
                now,
                now,
            );
            let profile = UserProfile::reconstruct(
                profile_id,
                credential_id,
                email.to_string(),
                firstname.to_string(),
                lastname.to_string(),
                validate_token.to_string(),
                now,
                now,
            );

            Ok((credential, profile))
        };

        tokio::time::timeout(self.query_timeout, writes)
            .await
            .map_err(|_| RepositoryError::Timeout)?
    }
}
