use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::models::Profile;
use super::photo::{process_photo, MAX_PHOTO_BYTES};
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson};
use crate::resources::crud::{insert_checked, update_checked};
use crate::state::AppState;
use crate::store::{Collection, Stored};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub photo_url: String,
    pub profile: Stored<Profile>,
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Stored<Profile>>, AppError> {
    current_profile(&state, &user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// PUT /api/profile
///
/// Creates the profile on first save, replaces it afterwards.
pub async fn handle_put_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<Profile>,
) -> Result<Json<Stored<Profile>>, AppError> {
    let profiles = Collection::<Profile>::new(state.store.as_ref());
    let saved = match current_profile(&state, &user.user_id).await? {
        Some(existing) => update_checked(&profiles, &user.user_id, existing.id, body).await?,
        None => insert_checked(&profiles, &user.user_id, body).await?,
    };
    Ok(Json(saved))
}

/// POST /api/profile/photo (multipart field `photo`)
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() == Some("photo") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload.ok_or_else(|| AppError::Validation("photo file is required".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("photo file is empty".to_string()));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(AppError::Validation(format!(
            "photo must be at most {} MB",
            MAX_PHOTO_BYTES / (1024 * 1024)
        )));
    }

    let photo = tokio::task::spawn_blocking(move || process_photo(&bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let key = format!(
        "{}-{}.{}",
        user.user_id,
        Uuid::new_v4().simple(),
        photo.extension
    );
    let photo_url = state
        .photos
        .put(&key, photo.bytes, photo.content_type)
        .await?;

    let profiles = Collection::<Profile>::new(state.store.as_ref());
    let profile = match current_profile(&state, &user.user_id).await? {
        Some(mut existing) => {
            existing.data.photo_url = Some(photo_url.clone());
            profiles
                .replace(&user.user_id, existing.id, &existing.data)
                .await?
        }
        None => {
            let profile = Profile {
                photo_url: Some(photo_url.clone()),
                ..Profile::default()
            };
            profiles.insert(&user.user_id, &profile).await?
        }
    };
    info!("Updated profile photo for user {}", user.user_id);

    Ok(Json(PhotoUploadResponse { photo_url, profile }))
}

async fn current_profile(
    state: &AppState,
    user_id: &str,
) -> Result<Option<Stored<Profile>>, AppError> {
    Ok(Collection::<Profile>::new(state.store.as_ref())
        .list(user_id)
        .await?
        .into_iter()
        .next())
}
