use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::oauth::{OAuthIdentity, OAuthProvider};
use super::password::{hash_password, validate_password, verify_password};
use super::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::models::user::{is_plausible_email, normalize_email, IdentityProvider, User, UserView};
use crate::resources::require;
use crate::state::AppState;
use crate::store::{Collection, Stored};

const RESET_TOKEN_PREFIX: &str = "password_reset:";
const OAUTH_STATE_PREFIX: &str = "oauth_state:";
const RESET_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email);
    if !is_plausible_email(&email) {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    validate_password(&req.password)?;
    require(&req.first_name, "firstName")?;
    require(&req.last_name, "lastName")?;

    if find_user_by_email(&state, &email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let user = User {
        email,
        password_hash: Some(hash_password(req.password).await?),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        provider: IdentityProvider::Local,
    };
    let stored = insert_user(&state, &user).await?;
    info!("Registered user {}", stored.user_id);

    Ok((StatusCode::CREATED, Json(auth_response(&state, &stored)?)))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let user = find_user_by_email(&state, &normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    let hash = user
        .data
        .password_hash
        .clone()
        .ok_or(AppError::InvalidCredentials)?;
    if !verify_password(req.password, hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(auth_response(&state, &user)?))
}

/// GET /auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserView>, AppError> {
    let id = Uuid::parse_str(&user.user_id).map_err(|_| AppError::Unauthorized)?;
    let stored = Collection::<User>::new(state.store.as_ref())
        .get(&user.user_id, id)
        .await?;
    Ok(Json(UserView::from(&stored)))
}

/// POST /auth/forgot-password
///
/// Always answers the same way so the endpoint cannot be used to discover
/// registered emails.
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    require(&req.email, "email")?;

    if let Some(user) = find_user_by_email(&state, &normalize_email(&req.email)).await? {
        let token = random_token();
        state
            .tokens
            .put(
                &format!("{RESET_TOKEN_PREFIX}{token}"),
                &user.user_id,
                RESET_TOKEN_TTL,
            )
            .await?;
        let reset_url = format!(
            "{}/reset-password?token={token}",
            state.config.frontend_url.trim_end_matches('/')
        );
        state
            .mailer
            .send_password_reset(&user.data.email, &reset_url)
            .await?;
    }

    Ok(Json(json!({
        "message": "If an account exists for that email, a reset link has been sent"
    })))
}

/// POST /auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    require(&req.token, "token")?;
    validate_password(&req.password)?;

    let invalid = || AppError::Validation("Invalid or expired reset token".to_string());
    let user_id = state
        .tokens
        .take(&format!("{RESET_TOKEN_PREFIX}{}", req.token))
        .await?
        .ok_or_else(invalid)?;
    let id = Uuid::parse_str(&user_id).map_err(|_| invalid())?;

    let users = Collection::<User>::new(state.store.as_ref());
    let mut user = users.get(&user_id, id).await.map_err(|e| match e {
        AppError::NotFound(_) => invalid(),
        other => other,
    })?;
    user.data.password_hash = Some(hash_password(req.password).await?);
    users.replace(&user_id, id, &user.data).await?;
    info!("Password reset for user {user_id}");

    Ok(Json(json!({ "message": "Password has been reset" })))
}

/// GET /auth/:provider
pub async fn handle_oauth_start(
    State(state): State<AppState>,
    AppPath(provider): AppPath<String>,
) -> Result<Redirect, AppError> {
    let provider = parse_provider(&provider)?;
    let oauth_state = random_token();
    let url = state.oauth.authorize_url(provider, &oauth_state)?;
    state
        .tokens
        .put(
            &format!("{OAUTH_STATE_PREFIX}{oauth_state}"),
            provider.as_str(),
            OAUTH_STATE_TTL,
        )
        .await?;
    Ok(Redirect::to(&url))
}

/// GET /auth/:provider/callback
pub async fn handle_oauth_callback(
    State(state): State<AppState>,
    AppPath(provider): AppPath<String>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Redirect, AppError> {
    let provider = parse_provider(&provider)?;
    let frontend = state.config.frontend_url.trim_end_matches('/').to_string();

    if let Some(error) = params.error {
        warn!("{} sign-in was not completed: {error}", provider.as_str());
        return Ok(Redirect::to(&format!("{frontend}/login?error=oauth_denied")));
    }

    let oauth_state = params.state.ok_or(AppError::Unauthorized)?;
    let issued_for = state
        .tokens
        .take(&format!("{OAUTH_STATE_PREFIX}{oauth_state}"))
        .await?;
    if issued_for.as_deref() != Some(provider.as_str()) {
        return Err(AppError::Unauthorized);
    }
    let code = params
        .code
        .ok_or_else(|| AppError::Validation("code is required".to_string()))?;

    let identity = state.oauth.fetch_identity(provider, &code).await?;
    let user = upsert_oauth_user(&state, provider, identity).await?;
    let token = state.jwt.issue(&user.user_id, &user.data.email)?;

    Ok(Redirect::to(&format!(
        "{frontend}/oauth/callback?token={token}"
    )))
}

fn parse_provider(name: &str) -> Result<OAuthProvider, AppError> {
    OAuthProvider::parse(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown sign-in provider '{name}'")))
}

async fn upsert_oauth_user(
    state: &AppState,
    provider: OAuthProvider,
    identity: OAuthIdentity,
) -> Result<Stored<User>, AppError> {
    let email = identity
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| is_plausible_email(e))
        .ok_or_else(|| AppError::OAuth("provider did not return an email".to_string()))?;
    if identity.email_verified != Some(true) {
        warn!(
            "Refusing {} sign-in for {email}: email not verified by the provider",
            provider.as_str()
        );
        return Err(AppError::OAuth(
            "provider did not verify the email address".to_string(),
        ));
    }

    if let Some(existing) = find_user_by_email(state, &email).await? {
        return Ok(existing);
    }

    let user = User {
        email,
        password_hash: None,
        first_name: identity.given_name.unwrap_or_default(),
        last_name: identity.family_name.unwrap_or_default(),
        provider: provider.identity_provider(),
    };
    let stored = insert_user(state, &user).await?;
    info!(
        "Created user {} from {} sign-in",
        stored.user_id,
        provider.as_str()
    );
    Ok(stored)
}

pub async fn find_user_by_email(
    state: &AppState,
    email: &str,
) -> Result<Option<Stored<User>>, AppError> {
    Ok(Collection::<User>::new(state.store.as_ref())
        .find_by("email", email)
        .await?
        .into_iter()
        .next())
}

async fn insert_user(state: &AppState, user: &User) -> Result<Stored<User>, AppError> {
    let id = Uuid::new_v4();
    Collection::<User>::new(state.store.as_ref())
        .insert_with_id(id, &id.to_string(), user)
        .await
}

fn auth_response(state: &AppState, user: &Stored<User>) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        token: state.jwt.issue(&user.user_id, &user.data.email)?,
        user: UserView::from(user),
    })
}

/// Two v4 UUIDs, hex encoded.
fn random_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
