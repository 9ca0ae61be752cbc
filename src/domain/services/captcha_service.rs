use async_trait::async_trait;

/// Outcome of a remote captcha check. A verifier never fails the whole
/// request; an unreachable service is its own verdict so the caller can
/// word the rejection differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptchaVerdict {
    Passed,
    Invalid,
    Unreachable(String),
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, response: &str) -> CaptchaVerdict;
}
