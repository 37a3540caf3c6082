//! Test-only RSA key material and token minting.
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use super::jwks::{Jwks, SigningKeys};
use super::verifier::VerifierConfig;

pub const KID: &str = "test-key-1";
pub const ISSUER: &str = "https://accounts.google.com";
pub const AUDIENCE: &str = "test-client.apps.googleusercontent.com";

const PRIVATE_KEY_PEM: &str = include_str!("../../../tests/fixtures/id_token_rsa.pem");
const MODULUS: &str = include_str!("../../../tests/fixtures/id_token_rsa.n");

pub fn config() -> VerifierConfig {
    VerifierConfig {
        issuer: ISSUER.into(),
        audience: AUDIENCE.into(),
        jwks_url: "http://127.0.0.1:9/unused".into(),
        leeway_seconds: 60,
        jwks_refresh: Duration::from_secs(3600),
    }
}

pub fn jwks_json() -> Value {
    json!({
        "keys": [{
            "kid": KID,
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": MODULUS.trim(),
            "e": "AQAB"
        }]
    })
}

pub fn signing_keys() -> SigningKeys {
    let jwks: Jwks = serde_json::from_value(jwks_json()).expect("fixture jwks");
    SigningKeys::fixed(&jwks)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims of a token that passes every check.
pub fn valid_claims(sub: &str, email: &str) -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": sub,
        "email": email,
        "email_verified": true,
        "name": "Test User",
        "iat": now(),
        "exp": now() + 3600
    })
}

pub fn mint_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.into());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).expect("fixture pem");
    jsonwebtoken::encode(&header, claims, &key).expect("sign fixture token")
}

pub fn mint(claims: &Value) -> String {
    mint_with_kid(claims, KID)
}
