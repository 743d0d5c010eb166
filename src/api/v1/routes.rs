/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer が必要な範囲 (/api/v1 配下) にはここで access middleware を掛ける
 * - role が必要な route は handler 側で AuthCtx::has_role を確認する (403)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{admin::admin, me::me};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/admin", get(admin));

    access::apply(protected, state)
}
