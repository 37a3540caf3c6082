//! Provider signing keys (JWKS), keyed by `kid`.
//!
//! Only keys are cached here. Verification results never are.
//! A refresh that fails leaves already trusted keys in service.
use std::{sync::Arc, time::Duration};

use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use serde::Deserialize;

use super::types::VerifyError;

// Single entry in `known_kids`: the kids of the last successful fetch.
const KNOWN_KIDS: &str = "jwks";
const MAX_KEYS: u64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kid: Option<String>,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

enum KeySource {
    Remote { client: reqwest::Client, url: String },
    #[cfg(test)]
    Fixed(Jwks),
}

pub struct SigningKeys {
    source: KeySource,
    refresh_after: Option<Duration>,
    /// kid -> key. No expiry of its own: entries are replaced on refresh.
    keys: Cache<String, Arc<DecodingKey>>,
    /// Expires after `refresh_after`; the next lookup then refetches.
    known_kids: Cache<String, Arc<Vec<String>>>,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            KeySource::Remote { url, .. } => url.as_str(),
            #[cfg(test)]
            KeySource::Fixed(_) => "fixed",
        };
        // Do not print key material
        f.debug_struct("SigningKeys")
            .field("source", &source)
            .field("refresh_after", &self.refresh_after)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// Keys fetched lazily from `url` and refetched once older than `refresh_after`.
    pub fn remote(client: reqwest::Client, url: impl Into<String>, refresh_after: Duration) -> Self {
        Self::build(
            KeySource::Remote {
                client,
                url: url.into(),
            },
            Some(refresh_after),
        )
    }

    /// A key set that never changes.
    #[cfg(test)]
    pub fn fixed(jwks: &Jwks) -> Self {
        Self::build(KeySource::Fixed(jwks.clone()), None)
    }

    fn build(source: KeySource, refresh_after: Option<Duration>) -> Self {
        let mut known_kids = Cache::<String, Arc<Vec<String>>>::builder().max_capacity(1);
        if let Some(ttl) = refresh_after {
            known_kids = known_kids.time_to_live(ttl);
        }

        Self {
            source,
            refresh_after,
            keys: Cache::builder().max_capacity(MAX_KEYS).build(),
            known_kids: known_kids.build(),
        }
    }

    /// Concurrent lookups during a refresh share one fetch and its outcome.
    pub async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        let known = self
            .known_kids
            .try_get_with(KNOWN_KIDS.to_string(), self.refresh())
            .await;

        match known {
            Ok(kids) if kids.iter().any(|k| k == kid) => {
                self.keys.get(kid).await.ok_or_else(|| unknown_kid(kid))
            }
            // Unknown kids never trigger an extra fetch.
            Ok(_) => Err(unknown_kid(kid)),
            Err(err) => match self.keys.get(kid).await {
                Some(key) => {
                    tracing::warn!(%kid, error = %err, "signing key refresh failed, using cached key");
                    Ok(key)
                }
                None => Err((*err).clone()),
            },
        }
    }

    async fn refresh(&self) -> Result<Arc<Vec<String>>, VerifyError> {
        let jwks = self.fetch().await?;
        let decoded = decoding_keys(&jwks);

        // Keys rotated out by the provider stop verifying.
        self.keys.invalidate_all();
        let mut kids = Vec::with_capacity(decoded.len());
        for (kid, key) in decoded {
            self.keys.insert(kid.clone(), key).await;
            kids.push(kid);
        }

        tracing::info!(keys = kids.len(), "identity provider signing keys refreshed");
        Ok(Arc::new(kids))
    }

    async fn fetch(&self) -> Result<Jwks, VerifyError> {
        let (client, url) = match &self.source {
            KeySource::Remote { client, url } => (client, url),
            #[cfg(test)]
            KeySource::Fixed(jwks) => return Ok(jwks.clone()),
        };

        tracing::debug!(%url, "fetching identity provider signing keys");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| VerifyError::Provider(format!("jwks request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifyError::Provider(format!(
                "jwks request returned {}",
                response.status()
            )));
        }

        response
            .json::<Jwks>()
            .await
            .map_err(|e| VerifyError::Provider(format!("jwks body unreadable: {e}")))
    }
}

fn unknown_kid(kid: &str) -> VerifyError {
    VerifyError::Invalid(format!("unknown signing key '{kid}'"))
}

/// RS256-capable RSA keys that carry a kid; everything else is skipped.
fn decoding_keys(jwks: &Jwks) -> Vec<(String, Arc<DecodingKey>)> {
    jwks.keys
        .iter()
        .filter(|k| k.kty == "RSA")
        .filter(|k| k.alg.as_deref().is_none_or(|alg| alg == "RS256"))
        .filter_map(|k| {
            let kid = k.kid.as_ref()?;
            match DecodingKey::from_rsa_components(&k.n, &k.e) {
                Ok(key) => Some((kid.clone(), Arc::new(key))),
                Err(err) => {
                    tracing::warn!(%kid, error = %err, "skipping unusable signing key");
                    None
                }
            }
        })
        .collect()
}
