// Accountability partners: an owner invites another user by email; once the
// invitation is accepted the partner may read the owner's goals and milestones
// and take part in the owner's discussion thread.

pub mod access;
pub mod discussions;
pub mod handlers;
pub mod models;
