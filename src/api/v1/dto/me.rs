use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::Authority;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub principal: String,
    // sorted (BTreeSet order)
    pub authorities: Vec<Authority>,
}

impl From<AuthCtx> for MeResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            principal: ctx.principal,
            authorities: ctx.authorities.into_iter().collect(),
        }
    }
}
