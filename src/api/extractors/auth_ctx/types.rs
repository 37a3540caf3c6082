/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - ID token の検証ロジックは services/identity 側の責務
 * - リクエストごとに作られ、リクエスト終了で破棄される (キャッシュしない)
 */
use crate::services::identity::{Claims, VerifiedIdentity};

/// Capability granted to a verified caller. There is a single fixed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    User,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "ROLE_USER",
        }
    }
}

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `principal` は email (無ければ subject)
/// - `claims` は検証済み ID token の全 claim (`/me` で返す)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: String,
    pub subject: String,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub authorities: Vec<Authority>,
    pub claims: Claims,
}

impl AuthCtx {
    pub fn from_identity(identity: VerifiedIdentity) -> Self {
        Self {
            principal: identity.principal().to_string(),
            subject: identity.subject,
            display_name: identity.display_name,
            picture: identity.picture,
            authorities: vec![Authority::User],
            claims: identity.claims,
        }
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}
