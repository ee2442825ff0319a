use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub port: u16,
    pub rust_log: String,
    /// Base URL this API is reachable at; used for photo URLs and OAuth redirects.
    pub public_base_url: String,
    /// Where the web client lives; reset links and OAuth logins land there.
    pub frontend_url: String,
    pub upload_dir: String,
    pub s3: Option<S3Config>,
    pub google: Option<OAuthCredentials>,
    pub microsoft: Option<OAuthCredentials>,
    pub microsoft_tenant: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match optional_env("S3_BUCKET") {
            Some(bucket) => Some(S3Config {
                bucket,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_expiry_secs: std::env::var("JWT_EXPIRY_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse::<i64>()
                .context("JWT_EXPIRY_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            public_base_url: optional_env("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            frontend_url: optional_env("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            upload_dir: optional_env("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            s3,
            google: oauth_credentials("GOOGLE"),
            microsoft: oauth_credentials("MICROSOFT"),
            microsoft_tenant: optional_env("MICROSOFT_TENANT")
                .unwrap_or_else(|| "common".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// A provider is enabled only when both its client id and secret are present.
fn oauth_credentials(prefix: &str) -> Option<OAuthCredentials> {
    Some(OAuthCredentials {
        client_id: optional_env(&format!("{prefix}_CLIENT_ID"))?,
        client_secret: optional_env(&format!("{prefix}_CLIENT_SECRET"))?,
    })
}
