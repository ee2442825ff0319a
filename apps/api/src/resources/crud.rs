use axum::{extract::State, http::StatusCode, Json};
use tracing::info;
use uuid::Uuid;

use super::Resource;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::state::AppState;
use crate::store::{Collection, Stored};

/// GET /api/<resource>
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Stored<R>>>, AppError> {
    let items = Collection::<R>::new(state.store.as_ref())
        .list(&user.user_id)
        .await?;
    Ok(Json(items))
}

/// GET /api/<resource>/:id
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Stored<R>>, AppError> {
    let item = Collection::<R>::new(state.store.as_ref())
        .get(&user.user_id, id)
        .await?;
    Ok(Json(item))
}

/// POST /api/<resource>
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<R>,
) -> Result<(StatusCode, Json<Stored<R>>), AppError> {
    let collection = Collection::<R>::new(state.store.as_ref());
    let created = insert_checked(&collection, &user.user_id, body).await?;
    info!("Created {} {} for user {}", R::NAME, created.id, user.user_id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/<resource>/:id
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<R>,
) -> Result<Json<Stored<R>>, AppError> {
    let collection = Collection::<R>::new(state.store.as_ref());
    let updated = update_checked(&collection, &user.user_id, id, body).await?;
    Ok(Json(updated))
}

/// DELETE /api/<resource>/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    Collection::<R>::new(state.store.as_ref())
        .delete(&user.user_id, id)
        .await?;
    info!("Deleted {} {id} for user {}", R::NAME, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Validates, rejects duplicates and inserts.
pub async fn insert_checked<R: Resource>(
    collection: &Collection<'_, R>,
    user_id: &str,
    body: R,
) -> Result<Stored<R>, AppError> {
    body.validate()?;
    let body = body.prepare_create();
    ensure_unique(collection, user_id, None, &body).await?;
    collection.insert(user_id, &body).await
}

/// Validates and replaces the body of `{id, user_id}`. An update that leaves
/// the body unchanged is not written, so `updatedAt` stays put.
pub async fn update_checked<R: Resource>(
    collection: &Collection<'_, R>,
    user_id: &str,
    id: Uuid,
    body: R,
) -> Result<Stored<R>, AppError> {
    body.validate()?;
    let existing = collection.get(user_id, id).await?;
    let body = body.prepare_update(&existing.data);
    if body == existing.data {
        return Ok(existing);
    }
    ensure_unique(collection, user_id, Some(id), &body).await?;
    collection.replace(user_id, id, &body).await
}

async fn ensure_unique<R: Resource>(
    collection: &Collection<'_, R>,
    user_id: &str,
    except: Option<Uuid>,
    body: &R,
) -> Result<(), AppError> {
    if !R::CHECK_DUPLICATES {
        return Ok(());
    }
    let existing = collection.list(user_id).await?;
    if existing
        .iter()
        .any(|other| Some(other.id) != except && body.conflicts_with(&other.data))
    {
        return Err(AppError::Conflict(format!("{} already exists", R::NAME)));
    }
    Ok(())
}
