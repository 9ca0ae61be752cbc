use crate::domain::{
    error::DomainError,
    models::{credential::UserCredential, profile::UserProfile},
    repositories::{
        account_registration_repository::AccountRegistrationRepository,
        credential_repository::CredentialRepository, profile_repository::ProfileRepository,
    },
    services::{
        captcha_service::{CaptchaVerdict, CaptchaVerifier},
        password_service::PasswordHasher,
        token_service::TokenGenerator,
    },
    validation::{self, CleanFields, SubmittedFields},
};

/// Deployment-level switches for the registration flow, passed to
/// `validate` explicitly rather than read from ambient state.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    pub captcha_enabled: bool,
}

#[derive(Debug)]
pub struct RegisteredAccount {
    pub credential: UserCredential,
    pub profile: UserProfile,
}

pub struct RegisterAccountUsecase<C, P, R, H, T, V>
where
    C: CredentialRepository,
    P: ProfileRepository,
    R: AccountRegistrationRepository,
    H: PasswordHasher,
    T: TokenGenerator,
    V: CaptchaVerifier,
{
    credential_repository: C,
    profile_repository: P,
    registration_repository: R,
    password_hasher: H,
    token_generator: T,
    captcha_verifier: V,
}

impl<C, P, R, H, T, V> RegisterAccountUsecase<C, P, R, H, T, V>
where
    C: CredentialRepository,
    P: ProfileRepository,
    R: AccountRegistrationRepository,
    H: PasswordHasher,
    T: TokenGenerator,
    V: CaptchaVerifier,
{
    pub fn new(
        credential_repository: C,
        profile_repository: P,
        registration_repository: R,
        password_hasher: H,
        token_generator: T,
        captcha_verifier: V,
    ) -> Self {
        Self {
            credential_repository,
            profile_repository,
            registration_repository,
            password_hasher,
            token_generator,
            captcha_verifier,
        }
    }

    /// Checks the submission without side effects. Field checks all run
    /// in one pass; the username/email existence probes only run when the
    /// field is otherwise well-formed; the confirmation comparisons only
    /// run when both halves passed on their own; the captcha check, when
    /// enabled, runs last. Database failures during the existence probes
    /// are not validation errors and propagate as such.
    pub async fn validate(
        &self,
        fields: &SubmittedFields,
        config: &RegistrationConfig,
    ) -> Result<CleanFields, DomainError> {
        let mut errors = validation::check_fields(fields);

        let username = fields.username.trim();
        if errors.field_is_clean("username")
            && self
                .credential_repository
                .find_by_username(username)
                .await?
                .is_some()
        {
            errors.add_field("username", validation::MSG_USERNAME_TAKEN);
        }

        let email = fields.email.trim();
        if errors.field_is_clean("email")
            && self.profile_repository.find_by_email(email).await?.is_some()
        {
            errors.add_field("email", validation::MSG_EMAIL_TAKEN);
        }

        if errors.field_is_clean("password")
            && errors.field_is_clean("password2")
            && fields.password != fields.password2
        {
            errors.add_global(validation::MSG_PASSWORD_MISMATCH);
        }

        if errors.field_is_clean("email")
            && errors.field_is_clean("email2")
            && email != fields.email2.trim()
        {
            errors.add_global(validation::MSG_EMAIL_MISMATCH);
        }

        if config.captcha_enabled {
            match fields.captcha.as_deref().map(str::trim) {
                None | Some("") => errors.add_field("captcha", validation::MSG_REQUIRED),
                Some(response) => match self.captcha_verifier.verify(response).await {
                    CaptchaVerdict::Passed => {}
                    CaptchaVerdict::Invalid => {
                        errors.add_field("captcha", validation::MSG_CAPTCHA_INVALID)
                    }
                    CaptchaVerdict::Unreachable(reason) => {
                        tracing::warn!(%reason, "captcha service unreachable");
                        errors.add_field("captcha", validation::MSG_CAPTCHA_UNREACHABLE)
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(CleanFields::new(
                username.to_string(),
                fields.password.clone(),
                email.to_string(),
                fields.firstname.trim().to_string(),
                fields.lastname.trim().to_string(),
            ))
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    /// Persists a validated submission: hashes the password, mints the
    /// confirmation token, and creates the inactive credential plus its
    /// profile in one transaction. Consumes the clean result so it can
    /// only be saved once.
    pub async fn save(&self, clean: CleanFields) -> Result<RegisteredAccount, DomainError> {
        let password_hash = self.password_hasher.hash(clean.password())?;
        let validate_token = self.token_generator.new_token()?;

        let (credential, profile) = self
            .registration_repository
            .create_account(
                clean.username(),
                password_hash,
                clean.email(),
                clean.firstname(),
                clean.lastname(),
                &validate_token,
            )
            .await?;

        tracing::info!(
            username = credential.username(),
            "account created, pending email confirmation"
        );

        Ok(RegisteredAccount {
            credential,
            profile,
        })
    }
}
