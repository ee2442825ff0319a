use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::{require, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnershipStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

/// Owned by the job-seeker who sent the invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    pub partner_id: String,
    pub partner_email: String,
    pub owner_email: String,
    pub status: PartnershipStatus,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}

impl Resource for Partnership {
    const COLLECTION: &'static str = "partnerships";
    const NAME: &'static str = "Partnership";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Celebrate,
    Support,
    Encourage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A message in an owner's discussion thread. Stored under the owner's id;
/// `sender_id` is the owner or one of their accepted partners.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscussionMessage {
    pub sender_id: String,
    pub sender_email: String,
    pub text: String,
    pub reactions: Vec<Reaction>,
}

impl Resource for DiscussionMessage {
    const COLLECTION: &'static str = "discussions";
    const NAME: &'static str = "Message";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.text, "text")
    }
}

impl DiscussionMessage {
    /// Appends a reaction. Returns false when the same user already left the
    /// same reaction; reactions are never removed.
    pub fn add_reaction(&mut self, reaction: Reaction) -> bool {
        let duplicate = self
            .reactions
            .iter()
            .any(|r| r.user_id == reaction.user_id && r.reaction_type == reaction.reaction_type);
        if duplicate {
            return false;
        }
        self.reactions.push(reaction);
        true
    }
}
