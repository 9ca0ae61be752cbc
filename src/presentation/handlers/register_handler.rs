use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        error::DomainError,
        repositories::{
            account_registration_repository::AccountRegistrationRepository,
            credential_repository::CredentialRepository, profile_repository::ProfileRepository,
        },
        services::{
            captcha_service::CaptchaVerifier, password_service::PasswordHasher,
            token_service::TokenGenerator,
        },
        validation::SubmittedFields,
    },
    usecase::register_account_usecase::{RegisterAccountUsecase, RegistrationConfig},
};

// Request

/// json for a registration submission
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
    pub email2: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub captcha: Option<String>,
}

impl From<RegisterRequest> for SubmittedFields {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            password2: request.password2,
            email: request.email,
            email2: request.email2,
            firstname: request.firstname,
            lastname: request.lastname,
            captcha: request.captcha,
        }
    }
}

// Response

/// json returned for a created account. The confirmation token stays
/// server-side; only the mailer gets to see it.
#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/* Router Function and Handler Function */

/// function returning the registration Router, to be nested by the main
/// router
pub fn create_register_router<C, P, R, H, T, V>(
    register_service: RegisterAccountUsecase<C, P, R, H, T, V>,
    config: RegistrationConfig,
) -> Router
where
    C: CredentialRepository + 'static,
    P: ProfileRepository + 'static,
    R: AccountRegistrationRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenGenerator + 'static,
    V: CaptchaVerifier + 'static,
{
    let state = AppState {
        register_service: Arc::new(register_service),
        config,
    };

    Router::new()
        .route("/register", post(register::<C, P, R, H, T, V>))
        .with_state(state)
}

pub struct AppState<C, P, R, H, T, V>
where
    C: CredentialRepository,
    P: ProfileRepository,
    R: AccountRegistrationRepository,
    H: PasswordHasher,
    T: TokenGenerator,
    V: CaptchaVerifier,
{
    pub register_service: Arc<RegisterAccountUsecase<C, P, R, H, T, V>>,
    pub config: RegistrationConfig,
}

impl<C, P, R, H, T, V> Clone for AppState<C, P, R, H, T, V>
where
    C: CredentialRepository,
    P: ProfileRepository,
    R: AccountRegistrationRepository,
    H: PasswordHasher,
    T: TokenGenerator,
    V: CaptchaVerifier,
{
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
            config: self.config.clone(),
        }
    }
}

/// handler function for registration submissions
async fn register<C, P, R, H, T, V>(
    State(state): State<AppState<C, P, R, H, T, V>>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse
where
    C: CredentialRepository + 'static,
    P: ProfileRepository + 'static,
    R: AccountRegistrationRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenGenerator + 'static,
    V: CaptchaVerifier + 'static,
{
    let fields = SubmittedFields::from(payload);

    let clean = match state
        .register_service
        .validate(&fields, &state.config)
        .await
    {
        Ok(clean) => clean,
        Err(DomainError::Validation(errors)) => {
            return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
        }
        Err(error) => {
            tracing::error!(%error, "registration checks could not complete");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json("registration failed"))
                .into_response();
        }
    };

    match state.register_service.save(clean).await {
        Ok(account) => {
            let response = RegisterResponse {
                id: account.credential.id().to_string(),
                username: account.credential.username().to_string(),
                email: account.profile.email().to_string(),
                firstname: account.profile.firstname().to_string(),
                lastname: account.profile.lastname().to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(error) => {
            tracing::error!(%error, "registration could not be saved");
            (StatusCode::INTERNAL_SERVER_ERROR, Json("registration failed")).into_response()
        }
    }
}
