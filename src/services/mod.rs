/*
 * Responsibility
 * - ドメイン側のサービス (HTTP/axum に依存しない)
 * - auth: トークン検証 + claims → principal/authorities 変換
 */
pub mod auth;
