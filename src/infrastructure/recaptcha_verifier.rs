use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::services::captcha_service::{CaptchaVerdict, CaptchaVerifier};

const VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret_key: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(secret_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            secret_key,
            verify_url: VERIFY_URL.to_string(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, response: &str) -> CaptchaVerdict {
        let params = [("secret", self.secret_key.as_str()), ("response", response)];

        let reply = match self
            .client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await
        {
            Ok(reply) => reply,
            Err(e) => return CaptchaVerdict::Unreachable(e.to_string()),
        };

        if !reply.status().is_success() {
            return CaptchaVerdict::Unreachable(format!(
                "verify endpoint returned {}",
                reply.status()
            ));
        }

        match reply.json::<VerifyResponse>().await {
            Ok(body) if body.success => CaptchaVerdict::Passed,
            Ok(_) => CaptchaVerdict::Invalid,
            Err(e) => CaptchaVerdict::Unreachable(e.to_string()),
        }
    }
}
