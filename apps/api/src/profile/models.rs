use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::is_plausible_email;
use crate::resources::Resource;

/// Free-form personal and contact details. Exactly one per user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<String>,
    /// Set only by the photo upload endpoint.
    pub photo_url: Option<String>,
}

impl Resource for Profile {
    const COLLECTION: &'static str = "profiles";
    const NAME: &'static str = "Profile";

    fn validate(&self) -> Result<(), AppError> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() && !is_plausible_email(email) => Err(
                AppError::Validation("email must be a valid address".to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn prepare_create(mut self) -> Self {
        self.photo_url = None;
        self
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        self.photo_url = existing.photo_url.clone();
        self
    }
}
