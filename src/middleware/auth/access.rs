//! access token（JWT）検証 → claims 変換 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を受け取り、`AccessTokenVerifier` で署名/iss/aud/exp を検証
//! - `JwtAuthenticationConverter` で principal と authorities（`ROLE_*` / `SCOPE_*`）を作る
//! - どの段階の失敗も 401。詳細は warn ログのみ

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or(AppError::Unauthorized)?;

    let verified = match state.verifier.verify(token) {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    let result = match state.converter.convert(&verified) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(
                error = %err,
                resource_id = state.converter.resource_id(),
                "access token claims rejected"
            );
            return Err(AppError::Unauthorized);
        }
    };

    tracing::debug!(
        principal = %result.principal,
        authorities = result.authorities.len(),
        "authenticated"
    );

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(result));

    Ok(next.run(req).await)
}
