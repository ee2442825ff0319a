//! In-process application for route tests: the real `Router` over in-memory
//! stores, driven with `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{JwtKeys, Mailer, OAuthClient};
use crate::config::{Config, OAuthCredentials};
use crate::errors::AppError;
use crate::models::user::{IdentityProvider, User};
use crate::profile::storage::LocalPhotoStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::tokens::MemoryTokenStore;
use crate::store::{Collection, MemoryDocumentStore};

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        redis_url: "redis://unused".into(),
        jwt_secret: "test-secret".into(),
        jwt_expiry_secs: 600,
        port: 8080,
        rust_log: "debug".into(),
        public_base_url: "http://localhost:8080".into(),
        frontend_url: "http://localhost:3000".into(),
        upload_dir: "uploads".into(),
        s3: None,
        google: None,
        microsoft: None,
        microsoft_tenant: "common".into(),
    }
}

/// Remembers the reset links it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub async fn last_reset_url(&self) -> Option<String> {
        self.sent.lock().await.last().map(|(_, url)| url.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .await
            .push((email.to_string(), reset_url.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
    pub mailer: Arc<RecordingMailer>,
    uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Google sign-in configured with dummy credentials.
    pub fn with_google() -> Self {
        let mut config = test_config();
        config.google = Some(OAuthCredentials {
            client_id: "google-client".into(),
            client_secret: "google-secret".into(),
        });
        Self::with_config(config)
    }

    fn with_config(mut config: Config) -> Self {
        let uploads = TempDir::new().unwrap();
        config.upload_dir = uploads.path().to_string_lossy().into_owned();

        let store = Arc::new(MemoryDocumentStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState {
            store: store.clone(),
            tokens: Arc::new(MemoryTokenStore::new()),
            photos: Arc::new(LocalPhotoStore::new(
                uploads.path(),
                &config.public_base_url,
            )),
            mailer: mailer.clone(),
            oauth: OAuthClient::from_config(&config).unwrap(),
            jwt: JwtKeys::new(&config.jwt_secret, config.jwt_expiry_secs),
            config,
        };

        TestApp {
            router: build_router(state.clone()),
            state,
            store,
            mailer,
            uploads,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.uploads.path().to_path_buf()
    }

    /// A valid bearer token for `user_id`; no user document is created.
    pub fn token_for(&self, user_id: &str) -> String {
        self.state
            .jwt
            .issue(user_id, &format!("{user_id}@example.com"))
            .unwrap()
    }

    /// Inserts a local user and returns `(token, user_id)`.
    pub async fn create_user(&self, email: &str) -> (String, String) {
        let id = Uuid::new_v4();
        let user = User {
            email: email.to_string(),
            password_hash: None,
            first_name: "Test".into(),
            last_name: "User".into(),
            provider: IdentityProvider::Local,
        };
        Collection::<User>::new(self.state.store.as_ref())
            .insert_with_id(id, &id.to_string(), &user)
            .await
            .unwrap();
        let token = self.state.jwt.issue(&id.to_string(), email).unwrap();
        (token, id.to_string())
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Sends a request and decodes the JSON response (`Null` for empty bodies).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
