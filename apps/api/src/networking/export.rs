use chrono::NaiveDate;
use csv::Writer;

use super::models::Contact;
use super::relationship::{insights, last_contact};
use crate::store::Stored;

const HEADERS: [&str; 14] = [
    "id",
    "firstName",
    "lastName",
    "email",
    "phone",
    "company",
    "jobTitle",
    "relationshipType",
    "engagementFrequency",
    "tags",
    "lastContact",
    "interactionCount",
    "health",
    "nextSuggestedContact",
];

/// Renders contacts as CSV, one row per contact with its current insights.
/// Tags are joined with `;`.
pub fn contacts_csv(contacts: &[Stored<Contact>], today: NaiveDate) -> anyhow::Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for contact in contacts {
        let c = &contact.data;
        let info = insights(c, today);
        let health = serde_json::to_value(info.health)?;
        writer.write_record([
            contact.id.to_string(),
            c.first_name.clone(),
            c.last_name.clone().unwrap_or_default(),
            c.email.clone().unwrap_or_default(),
            c.phone.clone().unwrap_or_default(),
            c.company.clone().unwrap_or_default(),
            c.job_title.clone().unwrap_or_default(),
            c.relationship_type.clone().unwrap_or_default(),
            c.engagement_frequency.as_str().to_string(),
            c.tags.join(";"),
            last_contact(&c.interactions)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            info.interaction_count.to_string(),
            health.as_str().unwrap_or_default().to_string(),
            info.next_suggested_contact.to_string(),
        ])?;
    }

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}
