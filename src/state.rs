/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: 署名/iss/aud/exp 検証, converter: claims → principal/authorities
 *   - admin_role: /api/v1/admin に必要な role 名 (ROLE_ なし)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::{AccessTokenVerifier, JwtAuthenticationConverter};

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<AccessTokenVerifier>,
    pub converter: Arc<JwtAuthenticationConverter>,
    pub admin_role: Arc<str>,
}

impl AppState {
    pub fn new(
        verifier: Arc<AccessTokenVerifier>,
        converter: Arc<JwtAuthenticationConverter>,
        admin_role: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            verifier,
            converter,
            admin_role: admin_role.into(),
        }
    }
}
