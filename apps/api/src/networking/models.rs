use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::is_plausible_email;
use crate::resources::{require, require_some, Resource};

fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Earliest year accepted for logged interactions and sessions.
const MIN_LOG_YEAR: i32 = 1900;

/// Rejects log dates before 1900 or more than a year past `today`.
pub fn ensure_log_date(date: NaiveDate, field: &str, today: NaiveDate) -> Result<(), AppError> {
    let earliest = NaiveDate::from_ymd_opt(MIN_LOG_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_add_signed(chrono::Duration::days(366))
        .unwrap_or(NaiveDate::MAX);
    if date < earliest || date > latest {
        return Err(AppError::Validation(format!(
            "{field} must be between {earliest} and {latest}"
        )));
    }
    Ok(())
}

// ---- contacts ----

/// How often the user wants to be in touch with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl EngagementFrequency {
    pub fn cadence_days(self) -> i64 {
        match self {
            EngagementFrequency::Weekly => 7,
            EngagementFrequency::Biweekly => 14,
            EngagementFrequency::Monthly => 30,
            EngagementFrequency::Quarterly => 90,
            EngagementFrequency::Yearly => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngagementFrequency::Weekly => "weekly",
            EngagementFrequency::Biweekly => "biweekly",
            EngagementFrequency::Monthly => "monthly",
            EngagementFrequency::Quarterly => "quarterly",
            EngagementFrequency::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The contact reached out.
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    #[serde(default = "new_id")]
    pub id: Uuid,
    /// call, email, meeting, coffee...
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: Direction,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    /// e.g. colleague, recruiter, alumni
    pub relationship_type: Option<String>,
    pub engagement_frequency: EngagementFrequency,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    /// Appended through `POST /api/contacts/:id/interactions`.
    pub interactions: Vec<Interaction>,
}

impl Resource for Contact {
    const COLLECTION: &'static str = "contacts";
    const NAME: &'static str = "Contact";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.first_name, "firstName")?;
        let today = Utc::now().date_naive();
        for interaction in &self.interactions {
            ensure_log_date(interaction.date, "interaction date", today)?;
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !is_plausible_email(email.trim()) {
                return Err(AppError::Validation("email is not valid".to_string()));
            }
        }
        Ok(())
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        self.interactions = existing.interactions.clone();
        self
    }
}

impl Contact {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name.trim()),
            _ => self.first_name.trim().to_string(),
        }
    }
}

// ---- campaigns ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Planned,
    #[default]
    Active,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignGoals {
    pub outreach_count: u32,
    pub response_target: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutreachStatus {
    #[default]
    Pending,
    Sent,
    Responded,
    NoResponse,
}

/// One tracked contact attempt. `variant` labels the message template for
/// A/B comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outreach {
    #[serde(default = "new_id")]
    pub id: Uuid,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub status: OutreachStatus,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Outreach {
    /// Moves to `status`, stamping `sentAt`/`respondedAt` the first time the
    /// attempt is sent or answered.
    pub fn transition(&mut self, status: OutreachStatus, now: DateTime<Utc>) {
        if status != OutreachStatus::Pending && self.sent_at.is_none() {
            self.sent_at = Some(now);
        }
        if status == OutreachStatus::Responded && self.responded_at.is_none() {
            self.responded_at = Some(now);
        }
        self.status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Campaign {
    pub name: String,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub goals: CampaignGoals,
    pub outreach: Vec<Outreach>,
}

impl Resource for Campaign {
    const COLLECTION: &'static str = "campaigns";
    const NAME: &'static str = "Campaign";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => Err(AppError::Validation(
                "endDate cannot be before the start date".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        self.outreach = existing.outreach.clone();
        self
    }
}

// ---- mentors ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorStatus {
    #[default]
    Active,
    Paused,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSession {
    #[serde(default = "new_id")]
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mentor {
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub expertise: Vec<String>,
    pub status: MentorStatus,
    pub focus_areas: Vec<String>,
    /// Appended through `POST /api/mentors/:id/sessions`.
    pub sessions: Vec<MentorSession>,
}

impl Resource for Mentor {
    const COLLECTION: &'static str = "mentors";
    const NAME: &'static str = "Mentor";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        let today = Utc::now().date_naive();
        for session in &self.sessions {
            ensure_log_date(session.date, "session date", today)?;
        }
        Ok(())
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        self.sessions = existing.sessions.clone();
        self
    }
}

// ---- events ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Planned,
    Attended,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkingEvent {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    /// conference, meetup, career fair...
    pub event_type: Option<String>,
    pub url: Option<String>,
    pub status: EventStatus,
    pub notes: Option<String>,
    /// Contacts met at the event.
    pub attendee_ids: Vec<Uuid>,
    pub follow_up_date: Option<NaiveDate>,
}

impl Resource for NetworkingEvent {
    const COLLECTION: &'static str = "events";
    const NAME: &'static str = "Event";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.name, "name")?;
        require_some(&self.date, "date")
    }
}
