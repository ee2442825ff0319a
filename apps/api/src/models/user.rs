use serde::{Deserialize, Serialize};

use crate::resources::Resource;
use crate::store::Stored;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    #[default]
    Local,
    Google,
    Microsoft,
}

/// An account. Stored in `users` with `userId` equal to its own `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Always lower-cased.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub provider: IdentityProvider,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const NAME: &'static str = "User";
}

/// The public shape of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub provider: IdentityProvider,
}

impl From<&Stored<User>> for UserView {
    fn from(user: &Stored<User>) -> Self {
        Self {
            id: user.user_id.clone(),
            email: user.data.email.clone(),
            first_name: user.data.first_name.clone(),
            last_name: user.data.last_name.clone(),
            provider: user.data.provider,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !email.contains(' ')
        }
        None => false,
    }
}
