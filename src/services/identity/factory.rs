/// Factory: build the identity verifier from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::identity::{IdTokenVerifier, IdentityVerifier};

pub fn build_identity_verifier(config: &Config) -> Result<Arc<dyn IdentityVerifier>, reqwest::Error> {
    // Only the key fetch talks to the network; no retry, one attempt per refresh.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .build()?;

    let verifier_config = config.verifier_config();
    tracing::info!(
        issuer = %verifier_config.issuer,
        jwks_url = %verifier_config.jwks_url,
        "identity verifier configured"
    );

    Ok(Arc::new(IdTokenVerifier::new(&verifier_config, http)))
}
