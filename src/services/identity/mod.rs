pub mod factory;
pub mod id_token;
pub mod jwks;
pub mod types;
pub mod verifier;

#[cfg(test)]
pub mod test_support;

pub use factory::build_identity_verifier;
pub use id_token::IdTokenVerifier;
pub use types::{Claims, VerifiedIdentity, VerifyError};
pub use verifier::{IdentityVerifier, VerifierConfig};
