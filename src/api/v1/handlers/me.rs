/*
 * Responsibility
 * - GET /api/v1/me
 * - middleware が作った AuthCtx (principal / authorities) をそのまま返す
 */
use axum::Json;

use crate::api::v1::dto::me::MeResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse::from(ctx))
}
