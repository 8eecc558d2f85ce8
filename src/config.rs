use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Adds `Secure` to session cookies; off for local http development.
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base used for public image urls: `<public_base>/object/public/<bucket>/<path>`.
    pub public_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "zelin-cafe".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "zelin-cafe-web".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60 * 24 * 7),
        };
        let session = SessionConfig {
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        let endpoint =
            std::env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".into());
        let public_base = std::env::var("STORAGE_PUBLIC_BASE")
            .unwrap_or_else(|_| format!("{}/storage/v1", endpoint.trim_end_matches('/')));
        let storage = StorageConfig {
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "menu-images".into()),
            access_key: std::env::var("STORAGE_ACCESS_KEY").context("STORAGE_ACCESS_KEY is not set")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY").context("STORAGE_SECRET_KEY is not set")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint,
            public_base,
        };

        Ok(Self {
            database_url,
            jwt,
            session,
            storage,
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()),
        })
    }
}
