//! OAuth 2.0 authorization-code login for Google and Microsoft accounts.
//!
//! Only `/auth/{provider}` and its callback talk to the providers; the rest of
//! the API sees the resulting user like any other.

use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::config::{Config, OAuthCredentials};
use crate::errors::AppError;
use crate::models::user::IdentityProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Microsoft,
}

impl OAuthProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "google" => Some(Self::Google),
            "microsoft" => Some(Self::Microsoft),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }

    pub fn identity_provider(&self) -> IdentityProvider {
        match self {
            Self::Google => IdentityProvider::Google,
            Self::Microsoft => IdentityProvider::Microsoft,
        }
    }
}

#[derive(Debug, Clone)]
struct ProviderSettings {
    credentials: OAuthCredentials,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
    scope: &'static str,
}

/// The person the provider vouched for.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthIdentity {
    pub sub: String,
    pub email: Option<String>,
    /// Only a `true` claim lets the email identify an account.
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    google: Option<ProviderSettings>,
    microsoft: Option<ProviderSettings>,
    callback_base: String,
}

impl OAuthClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let google = config.google.clone().map(|credentials| ProviderSettings {
            credentials,
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scope: "openid email profile",
        });
        let tenant = &config.microsoft_tenant;
        let microsoft = config.microsoft.clone().map(|credentials| ProviderSettings {
            credentials,
            authorize_url: format!(
                "https://login.microsoftonline.com/{tenant}/oauth2/v2.0/authorize"
            ),
            token_url: format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token"),
            userinfo_url: "https://graph.microsoft.com/oidc/userinfo".to_string(),
            scope: "openid email profile User.Read",
        });

        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(15)).build()?,
            google,
            microsoft,
            callback_base: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn settings(&self, provider: OAuthProvider) -> Result<&ProviderSettings, AppError> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Microsoft => self.microsoft.as_ref(),
        }
        .ok_or_else(|| {
            AppError::NotFound(format!("{} sign-in is not configured", provider.as_str()))
        })
    }

    fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!("{}/auth/{}/callback", self.callback_base, provider.as_str())
    }

    /// The provider consent URL the browser is sent to.
    pub fn authorize_url(&self, provider: OAuthProvider, state: &str) -> Result<String, AppError> {
        let settings = self.settings(provider)?;
        let redirect_uri = self.redirect_uri(provider);
        let url = Url::parse_with_params(
            &settings.authorize_url,
            &[
                ("client_id", settings.credentials.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", settings.scope),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::OAuth(format!("invalid authorize url: {e}")))?;
        Ok(url.to_string())
    }

    /// Exchanges the authorization code and reads the userinfo endpoint.
    pub async fn fetch_identity(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthIdentity, AppError> {
        let settings = self.settings(provider)?;
        let redirect_uri = self.redirect_uri(provider);

        let response = self
            .http
            .post(&settings.token_url)
            .form(&[
                ("client_id", settings.credentials.client_id.as_str()),
                ("client_secret", settings.credentials.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("token request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OAuth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("malformed token response: {e}")))?;

        let identity: OAuthIdentity = self
            .http
            .get(&settings.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::OAuth(format!("userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("malformed userinfo response: {e}")))?;

        debug!("{} identity resolved for subject {}", provider.as_str(), identity.sub);
        Ok(identity)
    }
}
