pub mod credential;
pub mod profile;
