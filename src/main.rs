mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{
    infrastructure::{
        account_registration_repository::PostgresAccountRegistrationRepository,
        argon2_password_hasher::Argon2PasswordHasher,
        credential_repository::PostgresCredentialRepository,
        profile_repository::PostgresProfileRepository,
        random_token_generator::RandomTokenGenerator, recaptcha_verifier::RecaptchaVerifier,
    },
    presentation::handlers::register_handler::create_register_router,
    usecase::register_account_usecase::{RegisterAccountUsecase, RegistrationConfig},
};

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    let ms = dotenvy::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut opt = ConnectOptions::new(dotenvy::var("DATABASE_URL")?);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(true);
    let db = Database::connect(opt).await?;

    let query_timeout = env_duration_ms("DB_QUERY_TIMEOUT_MS", 5_000);
    let credential_repository = PostgresCredentialRepository::new(db.clone(), query_timeout);
    let profile_repository = PostgresProfileRepository::new(db.clone(), query_timeout);
    let registration_repository =
        PostgresAccountRegistrationRepository::new(db.clone(), query_timeout);
    let password_hasher = Argon2PasswordHasher::new();
    let token_generator = RandomTokenGenerator::new();

    let captcha_enabled = dotenvy::var("RECAPTCHA_ENABLED")
        .map(|value| value == "true")
        .unwrap_or(false);
    let captcha_verifier = RecaptchaVerifier::new(
        dotenvy::var("RECAPTCHA_SECRET_KEY").unwrap_or_default(),
        env_duration_ms("RECAPTCHA_TIMEOUT_MS", 3_000),
    )?;
    let config = RegistrationConfig { captcha_enabled };

    let register_service = RegisterAccountUsecase::new(
        credential_repository,
        profile_repository,
        registration_repository,
        password_hasher,
        token_generator,
        captcha_verifier,
    );

    let app = Router::new().nest("/api", create_register_router(register_service, config));

    let addr: SocketAddr = dotenvy::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use rstest::*;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        domain::{
            error::{DomainError, RepositoryError},
            models::{
                credential::{HashedPassword, UserCredential},
                profile::UserProfile,
            },
            repositories::{
                account_registration_repository::AccountRegistrationRepository,
                credential_repository::CredentialRepository,
                profile_repository::ProfileRepository,
            },
            services::{
                captcha_service::{CaptchaVerdict, CaptchaVerifier},
                password_service::PasswordHasher,
                token_service::TokenGenerator,
            },
        },
        presentation::handlers::register_handler::{
            RegisterRequest, RegisterResponse, create_register_router,
        },
        usecase::register_account_usecase::{RegisterAccountUsecase, RegistrationConfig},
    };

    const MOCK_TOKEN: &str = "6d6f636b5f746f6b656e6d6f636b5f746f6b656e";

    fn mock_credential(username: &str, password_hash: HashedPassword) -> UserCredential {
        let now = Utc::now();
        UserCredential::reconstruct(
            Uuid::new_v4(),
            username.to_string(),
            password_hash,
            false,
            now,
            now,
        )
    }

    fn mock_profile(user_id: Uuid, email: &str, token: &str) -> UserProfile {
        let now = Utc::now();
        UserProfile::reconstruct(
            Uuid::new_v4(),
            user_id,
            email.to_string(),
            "Ann".to_string(),
            "Lee".to_string(),
            token.to_string(),
            now,
            now,
        )
    }

    // mock repository interface

    #[derive(Clone)]
    struct MockCredentialRepository;

    #[async_trait]
    impl CredentialRepository for MockCredentialRepository {
        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserCredential>, RepositoryError> {
            if username == "taken" {
                Ok(Some(mock_credential(
                    username,
                    HashedPassword::new("mock_hash".to_string()),
                )))
            } else {
                Ok(None)
            }
        }
    }

    #[derive(Clone)]
    struct MockProfileRepository;

    #[async_trait]
    impl ProfileRepository for MockProfileRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError> {
            if email == "taken@example.com" {
                Ok(Some(mock_profile(Uuid::new_v4(), email, MOCK_TOKEN)))
            } else {
                Ok(None)
            }
        }
    }

    #[derive(Clone)]
    struct MockRegistrationRepository;

    #[async_trait]
    impl AccountRegistrationRepository for MockRegistrationRepository {
        async fn create_account(
            &self,
            username: &str,
            password_hash: HashedPassword,
            email: &str,
            _firstname: &str,
            _lastname: &str,
            validate_token: &str,
        ) -> Result<(UserCredential, UserProfile), RepositoryError> {
            if email.starts_with("boom@") {
                return Err(RepositoryError::DatabaseError(
                    "profile insert failed".to_string(),
                ));
            }
            let credential = mock_credential(username, password_hash);
            let profile = mock_profile(credential.id(), email, validate_token);
            Ok((credential, profile))
        }
    }

    #[derive(Clone)]
    struct MockPasswordHasher;

    impl PasswordHasher for MockPasswordHasher {
        fn hash(&self, _plain_password: &str) -> Result<HashedPassword, DomainError> {
            Ok(HashedPassword::new("mock_hash".to_string()))
        }
    }

    #[derive(Clone)]
    struct MockTokenGenerator;

    impl TokenGenerator for MockTokenGenerator {
        fn new_token(&self) -> Result<String, DomainError> {
            Ok(MOCK_TOKEN.to_string())
        }
    }

    #[derive(Clone)]
    struct MockCaptchaVerifier;

    #[async_trait]
    impl CaptchaVerifier for MockCaptchaVerifier {
        async fn verify(&self, response: &str) -> CaptchaVerdict {
            match response {
                "good" => CaptchaVerdict::Passed,
                "bad" => CaptchaVerdict::Invalid,
                _ => CaptchaVerdict::Unreachable("connect timeout".to_string()),
            }
        }
    }

    fn test_router(captcha_enabled: bool) -> Router {
        let register_service = RegisterAccountUsecase::new(
            MockCredentialRepository,
            MockProfileRepository,
            MockRegistrationRepository,
            MockPasswordHasher,
            MockTokenGenerator,
            MockCaptchaVerifier,
        );

        // setup router: sync settings of main()
        Router::new().nest(
            "/api",
            create_register_router(register_service, RegistrationConfig { captcha_enabled }),
        )
    }

    #[fixture]
    fn test_app() -> Router {
        test_router(false)
    }

    #[fixture]
    fn test_app_with_captcha() -> Router {
        test_router(true)
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            username: "ann01".to_string(),
            password: "Secr3t!".to_string(),
            password2: "Secr3t!".to_string(),
            email: "a@x.com".to_string(),
            email2: "a@x.com".to_string(),
            firstname: "Ann".to_string(),
            lastname: "Lee".to_string(),
            captcha: None,
        }
    }

    /// general register helper, called from every test case
    async fn register(app: Router, request: &RegisterRequest) -> Response {
        let body = serde_json::to_string(request).unwrap();
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/register")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn response_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_positive(test_app: Router) {
        let response = register(test_app, &valid_request()).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: RegisterResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(created.username, "ann01");
        assert_eq!(created.email, "a@x.com");
        assert!(!created.id.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_email_mismatch_negative(test_app: Router) {
        let mut request = valid_request();
        request.email2 = "b@x.com".to_string();

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["global"][0].as_str().unwrap(),
            "The email addresses did not match."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_password_mismatch_negative(test_app: Router) {
        let mut request = valid_request();
        request.password2 = "Different1!".to_string();

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["global"][0].as_str().unwrap(),
            "The passwords did not match."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_duplicated_username_negative(test_app: Router) {
        let mut request = valid_request();
        request.username = "taken".to_string();

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["fields"]["username"][0].as_str().unwrap(),
            "An account with that username already exists."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_duplicated_email_negative(test_app: Router) {
        let mut request = valid_request();
        request.email = "taken@example.com".to_string();
        request.email2 = "taken@example.com".to_string();

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["fields"]["email"][0].as_str().unwrap(),
            "An account with that email address already exists."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_reports_all_invalid_fields(test_app: Router) {
        let request = RegisterRequest {
            username: String::new(),
            password: String::new(),
            password2: String::new(),
            email: String::new(),
            email2: String::new(),
            firstname: String::new(),
            lastname: String::new(),
            captcha: None,
        };

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(errors["fields"].as_object().unwrap().len(), 7);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_captcha_missing_negative(test_app_with_captcha: Router) {
        let response = register(test_app_with_captcha, &valid_request()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(errors["fields"]["captcha"][0].as_str().unwrap(), "Required.");
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_captcha_invalid_negative(test_app_with_captcha: Router) {
        let mut request = valid_request();
        request.captcha = Some("bad".to_string());

        let response = register(test_app_with_captcha, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["fields"]["captcha"][0].as_str().unwrap(),
            "The captcha is not valid."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_captcha_unreachable_negative(test_app_with_captcha: Router) {
        let mut request = valid_request();
        request.captcha = Some("flaky".to_string());

        let response = register(test_app_with_captcha, &request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = response_json(response).await;
        assert_eq!(
            errors["fields"]["captcha"][0].as_str().unwrap(),
            "Unable to check the captcha from the server."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_captcha_passes_positive(test_app_with_captcha: Router) {
        let mut request = valid_request();
        request.captcha = Some("good".to_string());

        let response = register(test_app_with_captcha, &request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_persistence_failure_is_opaque(test_app: Router) {
        let mut request = valid_request();
        request.email = "boom@x.com".to_string();
        request.email2 = "boom@x.com".to_string();

        let response = register(test_app, &request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body.as_str().unwrap(), "registration failed");
    }
}
