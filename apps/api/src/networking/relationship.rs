//! Relationship health for a contact, derived from its interaction log.
//!
//! Everything here is a pure function of the contact and `today`; nothing is
//! stored, so insights are always current when a contact is read.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::models::{Contact, Direction, EngagementFrequency, Interaction};

/// Window for `engagement_level`.
const ENGAGEMENT_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipHealth {
    Excellent,
    Good,
    NeedsAttention,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInsights {
    pub health: RelationshipHealth,
    pub reciprocity_score: u8,
    pub days_since_last_contact: Option<i64>,
    pub next_suggested_contact: NaiveDate,
    pub engagement_level: EngagementLevel,
    pub interaction_count: usize,
}

pub fn insights(contact: &Contact, today: NaiveDate) -> ContactInsights {
    let days = days_since_last_contact(&contact.interactions, today);
    ContactInsights {
        health: relationship_health(days, contact.engagement_frequency),
        reciprocity_score: reciprocity_score(&contact.interactions),
        days_since_last_contact: days,
        next_suggested_contact: next_suggested_contact(
            &contact.interactions,
            contact.engagement_frequency,
            today,
        ),
        engagement_level: engagement_level(&contact.interactions, today),
        interaction_count: contact.interactions.len(),
    }
}

pub fn last_contact(interactions: &[Interaction]) -> Option<NaiveDate> {
    interactions.iter().map(|i| i.date).max()
}

/// Days between the most recent interaction and `today`. Future-dated
/// interactions count as today.
pub fn days_since_last_contact(interactions: &[Interaction], today: NaiveDate) -> Option<i64> {
    last_contact(interactions).map(|last| (today - last).num_days().max(0))
}

pub fn relationship_health(
    days_since: Option<i64>,
    frequency: EngagementFrequency,
) -> RelationshipHealth {
    let Some(days) = days_since else {
        return RelationshipHealth::Poor;
    };
    let cadence = frequency.cadence_days();
    // 1.5x compared in halves to stay in integers
    if days <= cadence {
        RelationshipHealth::Excellent
    } else if days * 2 <= cadence * 3 {
        RelationshipHealth::Good
    } else if days <= cadence * 2 {
        RelationshipHealth::NeedsAttention
    } else {
        RelationshipHealth::Poor
    }
}

/// 100 when inbound and outbound interactions balance, falling towards 0 as
/// one side dominates. 0 when either side is empty.
pub fn reciprocity_score(interactions: &[Interaction]) -> u8 {
    let inbound = interactions
        .iter()
        .filter(|i| i.direction == Direction::Inbound)
        .count();
    let outbound = interactions.len() - inbound;
    if inbound == 0 || outbound == 0 {
        return 0;
    }
    let (low, high) = (inbound.min(outbound), inbound.max(outbound));
    (100.0 * low as f64 / high as f64).round() as u8
}

pub fn next_suggested_contact(
    interactions: &[Interaction],
    frequency: EngagementFrequency,
    today: NaiveDate,
) -> NaiveDate {
    match last_contact(interactions) {
        Some(last) => last
            .checked_add_signed(Duration::days(frequency.cadence_days()))
            .unwrap_or(NaiveDate::MAX)
            .max(today),
        None => today,
    }
}

pub fn engagement_level(interactions: &[Interaction], today: NaiveDate) -> EngagementLevel {
    let recent = interactions
        .iter()
        .filter(|i| {
            let age = (today - i.date).num_days();
            (0..=ENGAGEMENT_WINDOW_DAYS).contains(&age)
        })
        .count();
    match recent {
        n if n >= 6 => EngagementLevel::High,
        n if n >= 2 => EngagementLevel::Medium,
        _ => EngagementLevel::Low,
    }
}
