/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, Auth 設定, role converter 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::services::auth::VerifierKey;
use crate::services::auth::access_jwt::is_hmac;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for `JwtAuthenticationConverter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    // Key looked up inside `resource_access`
    pub resource_id: String,
    // Claim used as principal instead of `sub`
    pub principal_attribute: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,
    pub access_jwt_algorithm: Algorithm,
    pub access_jwt_key: VerifierKey,

    pub converter: ConverterConfig,
    // Role (without `ROLE_`) required by /api/v1/admin
    pub admin_role: String,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let auth_issuer = required("AUTH_ISSUER")?;
        let auth_audience = required("AUTH_AUDIENCE")?;

        let access_token_leeway_seconds = lookup("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let access_jwt_algorithm = match lookup("ACCESS_JWT_ALGORITHM") {
            Some(v) => Algorithm::from_str(v.trim())
                .map_err(|_| ConfigError::Invalid("ACCESS_JWT_ALGORITHM"))?,
            None => Algorithm::RS256,
        };

        let access_jwt_key = if is_hmac(access_jwt_algorithm) {
            VerifierKey::Secret(required("ACCESS_JWT_SECRET")?)
        } else {
            VerifierKey::PublicPem(required("ACCESS_JWT_PUBLIC_KEY_PEM")?.replace("\\n", "\n"))
        };

        let converter = ConverterConfig {
            resource_id: required("JWT_AUTH_CONVERTER_RESOURCE_ID")?,
            principal_attribute: lookup("JWT_AUTH_CONVERTER_PRINCIPAL_ATTRIBUTE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        };

        let admin_role = lookup("ADMIN_ROLE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "admin_role".to_string());

        let request_timeout = Duration::from_secs(
            lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        let request_body_limit_bytes = lookup("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            access_jwt_algorithm,
            access_jwt_key,
            converter,
            admin_role,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 5] = [
        ("AUTH_ISSUER", "https://id.example.com/realms/demo"),
        ("AUTH_AUDIENCE", "account"),
        ("ACCESS_JWT_ALGORITHM", "HS256"),
        ("ACCESS_JWT_SECRET", "s3cret"),
        ("JWT_AUTH_CONVERTER_RESOURCE_ID", "my-client"),
    ];

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_leeway_seconds, 60);
        assert_eq!(config.access_jwt_algorithm, Algorithm::HS256);
        assert!(matches!(config.access_jwt_key, VerifierKey::Secret(_)));
        assert_eq!(config.converter.resource_id, "my-client");
        assert_eq!(config.converter.principal_attribute, None);
        assert_eq!(config.admin_role, "admin_role");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn empty_principal_attribute_is_unset() {
        let mut pairs = BASE.to_vec();
        pairs.push(("JWT_AUTH_CONVERTER_PRINCIPAL_ATTRIBUTE", " "));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.converter.principal_attribute, None);

        let mut pairs = BASE.to_vec();
        pairs.push(("JWT_AUTH_CONVERTER_PRINCIPAL_ATTRIBUTE", "preferred_username"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.converter.principal_attribute.as_deref(),
            Some("preferred_username")
        );
    }

    #[test]
    fn missing_resource_id_fails() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "JWT_AUTH_CONVERTER_RESOURCE_ID")
            .collect();

        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Missing("JWT_AUTH_CONVERTER_RESOURCE_ID")
        );
    }

    #[test]
    fn rsa_default_needs_public_key() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "ACCESS_JWT_ALGORITHM")
            .collect();

        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM")
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("PORT")
        );

        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "ACCESS_JWT_ALGORITHM");
        pairs.push(("ACCESS_JWT_ALGORITHM", "none"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("ACCESS_JWT_ALGORITHM")
        );
    }
}
