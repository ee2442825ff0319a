use std::sync::Arc;

use crate::auth::{JwtKeys, Mailer, OAuthClient};
use crate::config::Config;
use crate::profile::storage::PhotoStore;
use crate::store::tokens::TokenStore;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Password-reset tokens and OAuth `state` values. Redis in production.
    pub tokens: Arc<dyn TokenStore>,
    /// Where processed profile photos go: local `UPLOAD_DIR` or S3.
    pub photos: Arc<dyn PhotoStore>,
    pub mailer: Arc<dyn Mailer>,
    pub oauth: OAuthClient,
    pub jwt: JwtKeys,
    pub config: Config,
}
