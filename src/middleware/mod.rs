/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 検証 → AuthCtx, http: request-id / trace / timeout など
 */
pub mod auth;
pub mod http;
