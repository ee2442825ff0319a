//! Ownership-scoped CRUD resources.
//!
//! A `Resource` is a document body stored in its own collection. The generic
//! handlers in `crud` serve `GET/POST /api/<r>` and `GET/PUT/DELETE /api/<r>/:id`
//! for every type implementing it.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

pub mod crud;

pub trait Resource:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages.
    const NAME: &'static str;
    /// When set, creates and updates reject bodies for which `conflicts_with`
    /// holds against another document of the same owner.
    const CHECK_DUPLICATES: bool = false;

    /// Checks required fields and value ranges. Runs before any write.
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Whether `self` would duplicate `other` for the same owner.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }

    /// Fills server-managed fields on a freshly posted body.
    fn prepare_create(self) -> Self {
        self
    }

    /// Carries server-managed fields over from the stored body on PUT.
    fn prepare_update(self, _existing: &Self) -> Self {
        self
    }
}

/// Rejects blank required text fields.
pub fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Rejects a missing required value of any type.
pub fn require_some<T>(value: &Option<T>, field: &str) -> Result<(), AppError> {
    if value.is_none() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
