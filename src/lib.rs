//! Keycloak-style resource server: verifies bearer JWTs and maps
//! `resource_access.<client>.roles` into `ROLE_*` authorities.
//!
//! The conversion itself lives in [`services::auth::JwtAuthenticationConverter`]
//! and has no HTTP dependencies; the rest is the axum shell around it.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
