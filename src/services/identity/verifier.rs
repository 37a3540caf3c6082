use std::time::Duration;

use async_trait::async_trait;

use super::types::{VerifiedIdentity, VerifyError};

/// Immutable verification settings, fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Trusted `iss` value.
    pub issuer: String,
    /// Expected `aud` value (the OAuth client id).
    pub audience: String,
    pub jwks_url: String,
    pub leeway_seconds: u64,
    /// How long a fetched key set is trusted before it is fetched again.
    pub jwks_refresh: Duration,
}

/// Verifies an opaque bearer credential against the identity provider.
///
/// Implementations hold no per-request state: verifying the same credential
/// twice yields identical identities.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Single verification attempt with the failure reason preserved.
    async fn check(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError>;

    /// Never fails: every failure cause becomes `None`.
    async fn verify(&self, credential: &str) -> Option<VerifiedIdentity> {
        if credential.is_empty() {
            return None;
        }

        match self.check(credential).await {
            Ok(identity) => Some(identity),
            Err(VerifyError::Provider(reason)) => {
                tracing::warn!(%reason, "identity provider unavailable, treating as unverified");
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "id token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fails(VerifyError, AtomicUsize);

    #[async_trait]
    impl IdentityVerifier for Fails {
        async fn check(&self, _credential: &str) -> Result<VerifiedIdentity, VerifyError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Err(self.0.clone())
        }
    }

    #[tokio::test]
    async fn verify_collapses_every_failure_to_none() {
        for err in [
            VerifyError::Expired,
            VerifyError::Invalid("bad".into()),
            VerifyError::Provider("down".into()),
        ] {
            let verifier = Fails(err, AtomicUsize::new(0));
            assert!(verifier.verify("token").await.is_none());
            assert_eq!(verifier.1.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn empty_credential_skips_the_provider() {
        let verifier = Fails(VerifyError::Expired, AtomicUsize::new(0));
        assert!(verifier.verify("").await.is_none());
        assert_eq!(verifier.1.load(Ordering::SeqCst), 0);
    }
}
