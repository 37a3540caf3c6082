use serde_json::{Map, Value};
use thiserror::Error;

/// Decoded claim set of a verified ID token.
pub type Claims = Map<String, Value>;

/// Why a credential was not accepted.
///
/// `verify` collapses all of these into `None`; callers that want the
/// richer taxonomy use `check` and convert into `AppError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("id token has expired")]
    Expired,
    #[error("invalid id token: {0}")]
    Invalid(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Identity produced by one successful verification.
///
/// Built from the provider payload; never cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub claims: Claims,
}

impl VerifiedIdentity {
    pub fn from_claims(claims: Claims) -> Result<Self, VerifyError> {
        let subject = string_claim(&claims, "sub")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| VerifyError::Invalid("empty 'sub' claim".into()))?;

        Ok(Self {
            subject,
            email: string_claim(&claims, "email"),
            display_name: string_claim(&claims, "name"),
            picture: string_claim(&claims, "picture"),
            claims,
        })
    }

    /// Principal name: the email claim, or the subject when the token carries no email.
    pub fn principal(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.subject)
    }
}

fn string_claim(claims: &Claims, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builds_identity_from_payload() {
        let identity = VerifiedIdentity::from_claims(claims(json!({
            "sub": "sub-1",
            "email": "a@b.com",
            "name": "Ada",
            "picture": "https://example.com/a.png",
            "hd": "b.com"
        })))
        .unwrap();

        assert_eq!(identity.subject, "sub-1");
        assert_eq!(identity.principal(), "a@b.com");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert_eq!(identity.claims["hd"], "b.com");
    }

    #[test]
    fn principal_falls_back_to_subject() {
        let identity = VerifiedIdentity::from_claims(claims(json!({"sub": "sub-2"}))).unwrap();
        assert_eq!(identity.principal(), "sub-2");
        assert!(identity.picture.is_none());
    }

    #[test]
    fn blank_subject_is_rejected() {
        let err = VerifiedIdentity::from_claims(claims(json!({"sub": "  "}))).unwrap_err();
        assert!(matches!(err, VerifyError::Invalid(_)));
    }
}
