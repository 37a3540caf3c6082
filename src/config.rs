/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth / Storage 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::identity::VerifierConfig;

const DEFAULT_ISSUER: &str = "https://accounts.google.com";
const DEFAULT_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: String,
    pub auth_leeway_seconds: u64,
    pub auth_jwks_refresh_seconds: u64,

    pub storage_bucket: String,
    pub storage_root: PathBuf,

    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = required("DATABASE_URL")?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_issuer = lookup("AUTH_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        let auth_audience = required("GOOGLE_CLIENT_ID")?;

        let auth_jwks_url =
            lookup("AUTH_JWKS_URL").unwrap_or_else(|| DEFAULT_JWKS_URL.to_string());
        url::Url::parse(&auth_jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;

        let auth_leeway_seconds = parse_or(&lookup, "AUTH_LEEWAY_SECONDS", 300)?;
        let auth_jwks_refresh_seconds = parse_or(&lookup, "AUTH_JWKS_REFRESH_SECONDS", 3600)?;

        let storage_bucket = required("STORAGE_BUCKET")?;
        if storage_bucket.contains(['/', '\\']) || storage_bucket.starts_with('.') {
            return Err(ConfigError::Invalid("STORAGE_BUCKET"));
        }
        let storage_root = PathBuf::from(
            lookup("STORAGE_ROOT").unwrap_or_else(|| "./data/objects".to_string()),
        );

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?);
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            auth_leeway_seconds,
            auth_jwks_refresh_seconds,
            storage_bucket,
            storage_root,
            request_timeout,
            max_upload_bytes,
        })
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            issuer: self.auth_issuer.clone(),
            audience: self.auth_audience.clone(),
            jwks_url: self.auth_jwks_url.clone(),
            leeway_seconds: self.auth_leeway_seconds,
            jwks_refresh: Duration::from_secs(self.auth_jwks_refresh_seconds),
        }
    }
}

// Absent keys take the default; present but unparsable keys fail startup.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
