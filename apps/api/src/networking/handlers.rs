use axum::{
    extract::State,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::campaign::{campaign_metrics, CampaignMetrics};
use super::export::contacts_csv;
use super::models::{
    ensure_log_date, Campaign, Contact, Interaction, Mentor, MentorSession, Outreach,
    OutreachStatus,
};
use super::relationship::{insights, ContactInsights};
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::resources::require;
use crate::state::AppState;
use crate::store::{Collection, Stored};

/// A contact as read by clients: the stored document plus derived insights.
#[derive(Debug, Serialize)]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Stored<Contact>,
    pub insights: ContactInsights,
}

impl From<Stored<Contact>> for ContactView {
    fn from(contact: Stored<Contact>) -> Self {
        let insights = insights(&contact.data, Utc::now().date_naive());
        ContactView { contact, insights }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutreachPatch {
    pub status: Option<OutreachStatus>,
    pub variant: Option<String>,
    pub notes: Option<String>,
}

/// GET /api/contacts
pub async fn handle_list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ContactView>>, AppError> {
    let contacts = Collection::<Contact>::new(state.store.as_ref())
        .list(&user.user_id)
        .await?;
    Ok(Json(contacts.into_iter().map(ContactView::from).collect()))
}

/// GET /api/contacts/:id
pub async fn handle_get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ContactView>, AppError> {
    let contact = Collection::<Contact>::new(state.store.as_ref())
        .get(&user.user_id, id)
        .await?;
    Ok(Json(contact.into()))
}

/// POST /api/contacts/:id/interactions
pub async fn handle_add_interaction(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(interaction): AppJson<Interaction>,
) -> Result<(StatusCode, Json<ContactView>), AppError> {
    require(&interaction.kind, "type")?;
    ensure_log_date(interaction.date, "date", Utc::now().date_naive())?;
    let contacts = Collection::<Contact>::new(state.store.as_ref());
    let mut contact = contacts.get(&user.user_id, id).await?;

    contact.data.interactions.push(interaction);
    contact.data.interactions.sort_by_key(|i| i.date);
    let updated = contacts.replace(&user.user_id, id, &contact.data).await?;
    Ok((StatusCode::CREATED, Json(updated.into())))
}

/// GET /api/contacts/export
pub async fn handle_export_contacts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let contacts = Collection::<Contact>::new(state.store.as_ref())
        .list(&user.user_id)
        .await?;
    let csv = contacts_csv(&contacts, Utc::now().date_naive())?;
    info!(
        "Exported {} contacts for user {}",
        contacts.len(),
        user.user_id
    );
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"contacts.csv\""),
        ],
        csv,
    ))
}

/// POST /api/campaigns/:id/outreach
///
/// `contactName` may be omitted when `contactId` names one of the caller's
/// contacts.
pub async fn handle_add_outreach(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(mut outreach): AppJson<Outreach>,
) -> Result<(StatusCode, Json<Stored<Campaign>>), AppError> {
    let campaigns = Collection::<Campaign>::new(state.store.as_ref());
    let mut campaign = campaigns.get(&user.user_id, id).await?;

    if let Some(contact_id) = outreach.contact_id {
        let contact = Collection::<Contact>::new(state.store.as_ref())
            .get(&user.user_id, contact_id)
            .await?;
        if outreach.contact_name.trim().is_empty() {
            outreach.contact_name = contact.data.display_name();
        }
    }
    require(&outreach.contact_name, "contactName")?;

    let status = outreach.status;
    outreach.transition(status, Utc::now());
    campaign.data.outreach.push(outreach);

    let updated = campaigns.replace(&user.user_id, id, &campaign.data).await?;
    Ok((StatusCode::CREATED, Json(updated)))
}

/// PATCH /api/campaigns/:id/outreach/:outreach_id
pub async fn handle_update_outreach(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath((id, outreach_id)): AppPath<(Uuid, Uuid)>,
    AppJson(patch): AppJson<OutreachPatch>,
) -> Result<Json<Stored<Campaign>>, AppError> {
    let campaigns = Collection::<Campaign>::new(state.store.as_ref());
    let mut campaign = campaigns.get(&user.user_id, id).await?;

    let outreach = campaign
        .data
        .outreach
        .iter_mut()
        .find(|o| o.id == outreach_id)
        .ok_or_else(|| AppError::NotFound(format!("Outreach {outreach_id} not found")))?;
    if let Some(status) = patch.status {
        outreach.transition(status, Utc::now());
    }
    if let Some(variant) = patch.variant {
        outreach.variant = Some(variant);
    }
    if let Some(notes) = patch.notes {
        outreach.notes = Some(notes);
    }

    let updated = campaigns.replace(&user.user_id, id, &campaign.data).await?;
    Ok(Json(updated))
}

/// GET /api/campaigns/:id/metrics
pub async fn handle_campaign_metrics(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CampaignMetrics>, AppError> {
    let campaign = Collection::<Campaign>::new(state.store.as_ref())
        .get(&user.user_id, id)
        .await?;
    Ok(Json(campaign_metrics(&campaign.data)))
}

/// POST /api/mentors/:id/sessions
pub async fn handle_add_session(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(session): AppJson<MentorSession>,
) -> Result<(StatusCode, Json<Stored<Mentor>>), AppError> {
    require(&session.topic, "topic")?;
    ensure_log_date(session.date, "date", Utc::now().date_naive())?;
    let mentors = Collection::<Mentor>::new(state.store.as_ref());
    let mut mentor = mentors.get(&user.user_id, id).await?;

    mentor.data.sessions.push(session);
    mentor.data.sessions.sort_by_key(|s| s.date);
    let updated = mentors.replace(&user.user_id, id, &mentor.data).await?;
    Ok((StatusCode::CREATED, Json(updated)))
}

#[cfg(test)]
mod tests {
    use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_contact_reads_include_insights() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (status, contact) = app
            .send(
                Method::POST,
                "/api/contacts",
                Some(&token),
                Some(json!({"firstName": "Ada", "engagementFrequency": "weekly"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = contact["_id"].as_str().unwrap();

        let (_, view) = app
            .send(Method::GET, &format!("/api/contacts/{id}"), Some(&token), None)
            .await;
        assert_eq!(view["firstName"], "Ada");
        assert_eq!(view["insights"]["health"], "poor");

        let today = Utc::now().date_naive();
        for (days_ago, direction) in [(3, "outbound"), (2, "inbound")] {
            let (status, _) = app
                .send(
                    Method::POST,
                    &format!("/api/contacts/{id}/interactions"),
                    Some(&token),
                    Some(json!({
                        "type": "call",
                        "direction": direction,
                        "date": (today - Duration::days(days_ago)).to_string()
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, list) = app.send(Method::GET, "/api/contacts", Some(&token), None).await;
        let insights = &list[0]["insights"];
        assert_eq!(insights["health"], "excellent");
        assert_eq!(insights["reciprocityScore"], 100);
        assert_eq!(insights["daysSinceLastContact"], 2);
        assert_eq!(insights["engagementLevel"], "medium");

        // PUT does not drop the interaction log
        let (_, updated) = app
            .send(
                Method::PUT,
                &format!("/api/contacts/{id}"),
                Some(&token),
                Some(json!({"firstName": "Ada", "company": "Analytical Engines"})),
            )
            .await;
        assert_eq!(updated["interactions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_interaction_requires_date() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, contact) = app
            .send(
                Method::POST,
                "/api/contacts",
                Some(&token),
                Some(json!({"firstName": "Ada"})),
            )
            .await;
        let id = contact["_id"].as_str().unwrap();
        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/contacts/{id}/interactions"),
                Some(&token),
                Some(json!({"type": "call", "direction": "outbound"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_interaction_date_is_rejected() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, contact) = app
            .send(
                Method::POST,
                "/api/contacts",
                Some(&token),
                Some(json!({"firstName": "Ada", "engagementFrequency": "yearly"})),
            )
            .await;
        let id = contact["_id"].as_str().unwrap();
        let interactions = format!("/api/contacts/{id}/interactions");

        for date in ["+262142-12-31", "1899-12-31"] {
            let (status, body) = app
                .send(
                    Method::POST,
                    &interactions,
                    Some(&token),
                    Some(json!({"type": "call", "direction": "outbound", "date": date})),
                )
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{date}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let (status, contacts) = app
            .send(Method::GET, "/api/contacts", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contacts[0]["interactions"].as_array().unwrap().len(), 0);
        let (status, _) = app
            .send(Method::GET, &format!("/api/contacts/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_export_contacts_csv() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        app.send(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({"firstName": "Ada", "tags": ["math", "history"]})),
        )
        .await;

        let response = app
            .raw(Method::GET, "/api/contacts/export", Some(&token), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("math;history"));
    }

    #[tokio::test]
    async fn test_campaign_outreach_and_metrics() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, contact) = app
            .send(
                Method::POST,
                "/api/contacts",
                Some(&token),
                Some(json!({"firstName": "Grace", "lastName": "Hopper"})),
            )
            .await;
        let (_, campaign) = app
            .send(
                Method::POST,
                "/api/campaigns",
                Some(&token),
                Some(json!({
                    "name": "Compiler teams",
                    "goals": {"outreachCount": 2, "responseTarget": 1}
                })),
            )
            .await;
        let id = campaign["_id"].as_str().unwrap();
        let outreach_url = format!("/api/campaigns/{id}/outreach");

        let (status, campaign) = app
            .send(
                Method::POST,
                &outreach_url,
                Some(&token),
                Some(json!({"contactId": contact["_id"], "variant": "A"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let entry = &campaign["outreach"][0];
        assert_eq!(entry["contactName"], "Grace Hopper");
        assert_eq!(entry["status"], "pending");
        let outreach_id = entry["id"].as_str().unwrap();

        let (status, campaign) = app
            .send(
                Method::PATCH,
                &format!("{outreach_url}/{outreach_id}"),
                Some(&token),
                Some(json!({"status": "responded"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(campaign["outreach"][0]["sentAt"].is_string());
        assert!(campaign["outreach"][0]["respondedAt"].is_string());

        let (_, metrics) = app
            .send(
                Method::GET,
                &format!("/api/campaigns/{id}/metrics"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(metrics["contacted"], 1);
        assert_eq!(metrics["responseRate"], 100.0);
        assert_eq!(metrics["outreachProgress"], 50.0);
        assert_eq!(metrics["responseProgress"], 100.0);
        assert_eq!(metrics["variants"][0]["variant"], "A");

        // campaign PUT leaves outreach alone
        let (_, updated) = app
            .send(
                Method::PUT,
                &format!("/api/campaigns/{id}"),
                Some(&token),
                Some(json!({"name": "Compiler teams", "status": "paused"})),
            )
            .await;
        assert_eq!(updated["outreach"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_outreach_is_404() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, campaign) = app
            .send(
                Method::POST,
                "/api/campaigns",
                Some(&token),
                Some(json!({"name": "Empty"})),
            )
            .await;
        let id = campaign["_id"].as_str().unwrap();
        let (status, _) = app
            .send(
                Method::PATCH,
                &format!("/api/campaigns/{id}/outreach/{}", uuid::Uuid::new_v4()),
                Some(&token),
                Some(json!({"status": "sent"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mentor_sessions() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, mentor) = app
            .send(
                Method::POST,
                "/api/mentors",
                Some(&token),
                Some(json!({"name": "Margaret", "expertise": ["systems"]})),
            )
            .await;
        let id = mentor["_id"].as_str().unwrap();
        let sessions = format!("/api/mentors/{id}/sessions");

        for date in ["2026-02-10", "2026-01-05"] {
            let (status, _) = app
                .send(
                    Method::POST,
                    &sessions,
                    Some(&token),
                    Some(json!({"date": date, "topic": "Career plan"})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, mentor) = app
            .send(Method::GET, &format!("/api/mentors/{id}"), Some(&token), None)
            .await;
        assert_eq!(mentor["sessions"][0]["date"], "2026-01-05");
        assert_eq!(mentor["status"], "active");

        let (status, _) = app
            .send(
                Method::POST,
                &sessions,
                Some(&token),
                Some(json!({"date": "2026-03-01"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_session_date_is_rejected() {
        let app = TestApp::new();
        let token = app.token_for("seeker");
        let (_, mentor) = app
            .send(
                Method::POST,
                "/api/mentors",
                Some(&token),
                Some(json!({"name": "Margaret"})),
            )
            .await;
        let id = mentor["_id"].as_str().unwrap();

        for date in ["+262142-12-31", "1800-01-01"] {
            let (status, _) = app
                .send(
                    Method::POST,
                    &format!("/api/mentors/{id}/sessions"),
                    Some(&token),
                    Some(json!({"date": date, "topic": "Career plan"})),
                )
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{date}");
        }

        let (status, mentor) = app
            .send(Method::GET, &format!("/api/mentors/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mentor["sessions"].as_array().unwrap().len(), 0);
    }
}
