use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::access::ensure_access;
use super::models::{DiscussionMessage, Reaction, ReactionType};
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::resources::crud::insert_checked;
use crate::state::AppState;
use crate::store::{Collection, Stored};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostMessageRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
}

/// GET /api/discussions/:owner_id
pub async fn handle_list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(owner_id): AppPath<String>,
) -> Result<Json<Vec<Stored<DiscussionMessage>>>, AppError> {
    ensure_access(&state, &owner_id, &user.user_id).await?;
    let messages = Collection::<DiscussionMessage>::new(state.store.as_ref())
        .list(&owner_id)
        .await?;
    Ok(Json(messages))
}

/// POST /api/discussions/:owner_id
pub async fn handle_post_message(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(owner_id): AppPath<String>,
    AppJson(req): AppJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<Stored<DiscussionMessage>>), AppError> {
    ensure_access(&state, &owner_id, &user.user_id).await?;
    let message = DiscussionMessage {
        sender_id: user.user_id,
        sender_email: user.email,
        text: req.text.trim().to_string(),
        reactions: Vec::new(),
    };
    let messages = Collection::<DiscussionMessage>::new(state.store.as_ref());
    let created = insert_checked(&messages, &owner_id, message).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/discussions/:owner_id/:message_id/reactions
///
/// A repeated reaction of the same type by the same user is a no-op.
pub async fn handle_react(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((owner_id, message_id)): AppPath<(String, Uuid)>,
    AppJson(req): AppJson<ReactRequest>,
) -> Result<Json<Stored<DiscussionMessage>>, AppError> {
    ensure_access(&state, &owner_id, &user.user_id).await?;
    let messages = Collection::<DiscussionMessage>::new(state.store.as_ref());
    let mut message = messages.get(&owner_id, message_id).await?;

    let added = message.data.add_reaction(Reaction {
        reaction_type: req.reaction_type,
        user_id: user.user_id,
        created_at: Utc::now(),
    });
    if !added {
        return Ok(Json(message));
    }
    let updated = messages.replace(&owner_id, message_id, &message.data).await?;
    Ok(Json(updated))
}
