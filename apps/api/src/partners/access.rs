use crate::errors::AppError;
use crate::state::AppState;
use crate::store::Collection;

use super::models::{Partnership, PartnershipStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Partner,
}

/// Resolves what `caller` may do with `owner_id`'s shared data. Anyone who is
/// neither the owner nor an accepted partner gets 403.
pub async fn ensure_access(
    state: &AppState,
    owner_id: &str,
    caller_id: &str,
) -> Result<Access, AppError> {
    if owner_id == caller_id {
        return Ok(Access::Owner);
    }
    let partnerships = Collection::<Partnership>::new(state.store.as_ref())
        .list(owner_id)
        .await?;
    let accepted = partnerships
        .iter()
        .any(|p| p.data.partner_id == caller_id && p.data.status == PartnershipStatus::Accepted);
    if accepted {
        Ok(Access::Partner)
    } else {
        Err(AppError::Forbidden)
    }
}
