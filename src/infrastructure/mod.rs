pub mod account_registration_repository;
pub mod argon2_password_hasher;
pub mod credential_repository;
pub mod profile_repository;
pub mod random_token_generator;
pub mod recaptcha_verifier;
