/*
 * Responsibility
 * - GET /api/v1/admin
 * - 設定された admin role (ROLE_ 付きで照合) を持たない場合は 403
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::me::MeResponse;
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::state::AppState;

pub async fn admin(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<MeResponse>, AppError> {
    if !ctx.has_role(&state.admin_role) {
        tracing::warn!(
            principal = %ctx.principal,
            role = %state.admin_role,
            "required role missing"
        );
        return Err(AppError::Forbidden);
    }

    Ok(Json(MeResponse::from(ctx)))
}
