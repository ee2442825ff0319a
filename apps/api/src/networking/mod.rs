// Networking CRM: contacts with their interaction log, outreach campaigns,
// mentors and events. Relationship health and campaign metrics are computed
// on read.

pub mod campaign;
pub mod export;
pub mod handlers;
pub mod models;
pub mod relationship;
