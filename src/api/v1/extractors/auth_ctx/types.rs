/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証・変換して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証や claims → authorities の変換は middleware/services 側の責務
 */

use std::collections::BTreeSet;

use crate::services::auth::Authority;
use crate::services::auth::AuthenticationResult;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `principal` は principal attribute claim（未設定なら `sub`）
/// - `authorities` は `ROLE_*`（resource_access の client roles）と `SCOPE_*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub principal: String,
    pub authorities: BTreeSet<Authority>,
}

impl AuthCtx {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == authority)
    }

    /// `has_role("admin")` checks for `ROLE_admin`. The prefix is always added.
    pub fn has_role(&self, role: &str) -> bool {
        self.has_authority(Authority::role(role).as_str())
    }
}

impl From<AuthenticationResult> for AuthCtx {
    fn from(result: AuthenticationResult) -> Self {
        Self {
            principal: result.principal,
            authorities: result.authorities,
        }
    }
}
