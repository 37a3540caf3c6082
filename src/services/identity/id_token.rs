use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};

use super::jwks::SigningKeys;
use super::types::{Claims, VerifiedIdentity, VerifyError};
use super::verifier::{IdentityVerifier, VerifierConfig};

/// RS256 ID-token verifier backed by the provider's published signing keys.
///
/// `jsonwebtoken::Validation` checks:
/// - signature
/// - `exp` / `nbf` (with leeway)
/// - `iss` and `aud` (because we set them)
/// - presence of `sub`, `exp`, `iss`, `aud`
pub struct IdTokenVerifier {
    keys: SigningKeys,
    validation: Validation,
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("keys", &self.keys)
            .field("validation", &self.validation)
            .finish()
    }
}

impl IdTokenVerifier {
    /// Verifier that fetches signing keys from `config.jwks_url`.
    pub fn new(config: &VerifierConfig, http: reqwest::Client) -> Self {
        let keys = SigningKeys::remote(http, config.jwks_url.clone(), config.jwks_refresh);
        Self::with_keys(config, keys)
    }

    pub fn with_keys(config: &VerifierConfig, keys: SigningKeys) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        Self { keys, validation }
    }
}

#[async_trait]
impl IdentityVerifier for IdTokenVerifier {
    async fn check(&self, credential: &str) -> Result<VerifiedIdentity, VerifyError> {
        let header = jsonwebtoken::decode_header(credential)
            .map_err(|e| VerifyError::Invalid(format!("malformed token: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Invalid(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Invalid("token has no key id".into()))?;

        let key = self.keys.key_for(&kid).await?;

        let data = jsonwebtoken::decode::<Claims>(credential, &key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Invalid(e.to_string()),
            })?;

        VerifiedIdentity::from_claims(data.claims)
    }
}
