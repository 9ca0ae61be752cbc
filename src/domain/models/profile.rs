use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;

/// Profile data attached to a credential. `user_id` and `validate_token`
/// are filled in by the registration flow, never by the applicant; the
/// token is what the email confirmation link later presents.
#[derive(Debug, Clone)]
pub struct UserProfile {
    id: Uuid,
    user_id: Uuid,
    email: String,
    firstname: String,
    lastname: String,
    validate_token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: Uuid,
        user_id: Uuid,
        email: String,
        firstname: String,
        lastname: String,
        validate_token: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            email,
            firstname,
            lastname,
            validate_token,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn validate_token(&self) -> &str {
        &self.validate_token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
