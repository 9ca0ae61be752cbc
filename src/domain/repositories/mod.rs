pub mod account_registration_repository;
pub mod credential_repository;
pub mod profile_repository;
