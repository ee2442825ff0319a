pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers as auth;
use crate::goals::handlers as goals;
use crate::goals::models::{JobSearchGoal, JobSearchMilestone};
use crate::models::career::{Certification, Education, Employment, Project, Record, Skill};
use crate::networking::handlers as networking;
use crate::networking::models::{Campaign, Contact, Mentor, NetworkingEvent};
use crate::partners::{discussions, handlers as partners};
use crate::profile::handlers as profile;
use crate::profile::photo::MAX_PHOTO_BYTES;
use crate::resources::{crud, Resource};
use crate::state::AppState;

/// Room for multipart framing around a maximum-size photo.
const PHOTO_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/me", get(auth::handle_me))
        .route("/auth/forgot-password", post(auth::handle_forgot_password))
        .route("/auth/reset-password", post(auth::handle_reset_password))
        .route("/auth/:provider", get(auth::handle_oauth_start))
        .route("/auth/:provider/callback", get(auth::handle_oauth_callback))
        // Profile
        .route(
            "/api/profile",
            get(profile::handle_get_profile).put(profile::handle_put_profile),
        )
        .route(
            "/api/profile/photo",
            post(profile::handle_upload_photo).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        // Goals
        .route("/api/goals/summary", get(goals::handle_goal_summary))
        .route(
            "/api/goals/:id/progress",
            patch(goals::handle_update_progress),
        )
        // Contacts: reads carry relationship insights
        .route(
            "/api/contacts",
            get(networking::handle_list_contacts).post(crud::create::<Contact>),
        )
        .route(
            "/api/contacts/export",
            get(networking::handle_export_contacts),
        )
        .route(
            "/api/contacts/:id",
            get(networking::handle_get_contact)
                .put(crud::update::<Contact>)
                .delete(crud::delete::<Contact>),
        )
        .route(
            "/api/contacts/:id/interactions",
            post(networking::handle_add_interaction),
        )
        // Campaigns and mentors
        .route(
            "/api/campaigns/:id/outreach",
            post(networking::handle_add_outreach),
        )
        .route(
            "/api/campaigns/:id/outreach/:outreach_id",
            patch(networking::handle_update_outreach),
        )
        .route(
            "/api/campaigns/:id/metrics",
            get(networking::handle_campaign_metrics),
        )
        .route(
            "/api/mentors/:id/sessions",
            post(networking::handle_add_session),
        )
        // Accountability partners
        .route(
            "/api/partners",
            get(partners::handle_list_partners).post(partners::handle_invite_partner),
        )
        .route(
            "/api/partners/:id",
            delete(partners::handle_remove_partner),
        )
        .route(
            "/api/partners/invitations",
            get(partners::handle_list_invitations),
        )
        .route(
            "/api/partners/invitations/:id/accept",
            post(partners::handle_accept_invitation),
        )
        .route(
            "/api/partners/invitations/:id/decline",
            post(partners::handle_decline_invitation),
        )
        .route(
            "/api/partners/shared/:owner_id/goals",
            get(partners::handle_shared_goals),
        )
        .route(
            "/api/partners/shared/:owner_id/milestones",
            get(partners::handle_shared_milestones),
        )
        .route(
            "/api/discussions/:owner_id",
            get(discussions::handle_list_messages).post(discussions::handle_post_message),
        )
        .route(
            "/api/discussions/:owner_id/:message_id/reactions",
            post(discussions::handle_react),
        );

    let router = resource::<Skill>(router, "/api/skills");
    let router = resource::<Education>(router, "/api/education");
    let router = resource::<Employment>(router, "/api/employment");
    let router = resource::<Certification>(router, "/api/certifications");
    let router = resource::<Project>(router, "/api/projects");
    let router = resource::<Record>(router, "/api/record");
    let router = resource::<JobSearchGoal>(router, "/api/goals");
    let router = resource::<JobSearchMilestone>(router, "/api/milestones");
    let router = resource::<Campaign>(router, "/api/campaigns");
    let router = resource::<Mentor>(router, "/api/mentors");
    let router = resource::<NetworkingEvent>(router, "/api/events");

    // Photos are served from disk only when they are stored there.
    let router = if state.config.s3.is_none() {
        router.nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
    } else {
        router
    };

    router.with_state(state)
}

/// Mounts the generic CRUD handlers for `R` at `base` and `base/:id`.
fn resource<R: Resource>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(crud::list::<R>).post(crud::create::<R>))
        .route(
            &format!("{base}/:id"),
            get(crud::get::<R>)
                .put(crud::update::<R>)
                .delete(crud::delete::<R>),
        )
}
