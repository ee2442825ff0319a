use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::access::ensure_access;
use super::models::{Partnership, PartnershipStatus};
use crate::auth::handlers::find_user_by_email;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::goals::models::{JobSearchGoal, JobSearchMilestone};
use crate::models::user::normalize_email;
use crate::resources::require;
use crate::state::AppState;
use crate::store::{Collection, Stored};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InviteRequest {
    pub partner_email: String,
}

/// GET /api/partners
pub async fn handle_list_partners(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Stored<Partnership>>>, AppError> {
    let partners = Collection::<Partnership>::new(state.store.as_ref())
        .list(&user.user_id)
        .await?;
    Ok(Json(partners))
}

/// POST /api/partners
pub async fn handle_invite_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<InviteRequest>,
) -> Result<(StatusCode, Json<Stored<Partnership>>), AppError> {
    require(&req.partner_email, "partnerEmail")?;
    let email = normalize_email(&req.partner_email);

    let partner = find_user_by_email(&state, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with email {email}")))?;
    if partner.user_id == user.user_id {
        return Err(AppError::Validation(
            "You cannot invite yourself as a partner".to_string(),
        ));
    }

    let partnerships = Collection::<Partnership>::new(state.store.as_ref());
    let existing = partnerships.list(&user.user_id).await?;
    if existing
        .iter()
        .any(|p| p.data.partner_id == partner.user_id && p.data.status != PartnershipStatus::Declined)
    {
        return Err(AppError::Conflict(
            "This partner has already been invited".to_string(),
        ));
    }

    let created = partnerships
        .insert(
            &user.user_id,
            &Partnership {
                partner_id: partner.user_id.clone(),
                partner_email: email,
                owner_email: user.email.clone(),
                status: PartnershipStatus::Pending,
                responded_at: None,
            },
        )
        .await?;
    info!(
        "User {} invited partner {}",
        user.user_id, created.data.partner_id
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/partners/:id
pub async fn handle_remove_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    Collection::<Partnership>::new(state.store.as_ref())
        .delete(&user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/partners/invitations
///
/// Partnerships in which the caller is the partner.
pub async fn handle_list_invitations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Stored<Partnership>>>, AppError> {
    let invitations = Collection::<Partnership>::new(state.store.as_ref())
        .find_by("partnerId", &user.user_id)
        .await?;
    Ok(Json(invitations))
}

/// POST /api/partners/invitations/:id/accept
pub async fn handle_accept_invitation(
    state: State<AppState>,
    user: AuthUser,
    id: AppPath<Uuid>,
) -> Result<Json<Stored<Partnership>>, AppError> {
    respond_to_invitation(state, user, id, PartnershipStatus::Accepted).await
}

/// POST /api/partners/invitations/:id/decline
pub async fn handle_decline_invitation(
    state: State<AppState>,
    user: AuthUser,
    id: AppPath<Uuid>,
) -> Result<Json<Stored<Partnership>>, AppError> {
    respond_to_invitation(state, user, id, PartnershipStatus::Declined).await
}

async fn respond_to_invitation(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    status: PartnershipStatus,
) -> Result<Json<Stored<Partnership>>, AppError> {
    let partnerships = Collection::<Partnership>::new(state.store.as_ref());
    let mut invitation = partnerships
        .find_by("partnerId", &user.user_id)
        .await?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Invitation {id} not found")))?;

    if invitation.data.status == status {
        return Ok(Json(invitation));
    }
    if invitation.data.status != PartnershipStatus::Pending {
        return Err(AppError::Conflict(
            "Invitation has already been answered".to_string(),
        ));
    }
    invitation.data.status = status;
    invitation.data.responded_at = Some(Utc::now());

    // the document belongs to the inviting owner
    let updated = partnerships
        .replace(&invitation.user_id, id, &invitation.data)
        .await?;
    Ok(Json(updated))
}

/// GET /api/partners/shared/:owner_id/goals
pub async fn handle_shared_goals(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(owner_id): AppPath<String>,
) -> Result<Json<Vec<Stored<JobSearchGoal>>>, AppError> {
    ensure_access(&state, &owner_id, &user.user_id).await?;
    let goals = Collection::<JobSearchGoal>::new(state.store.as_ref())
        .list(&owner_id)
        .await?;
    Ok(Json(goals))
}

/// GET /api/partners/shared/:owner_id/milestones
pub async fn handle_shared_milestones(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(owner_id): AppPath<String>,
) -> Result<Json<Vec<Stored<JobSearchMilestone>>>, AppError> {
    ensure_access(&state, &owner_id, &user.user_id).await?;
    let milestones = Collection::<JobSearchMilestone>::new(state.store.as_ref())
        .list(&owner_id)
        .await?;
    Ok(Json(milestones))
}
