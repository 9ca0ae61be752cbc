pub mod captcha_service;
pub mod password_service;
pub mod token_service;
