// Accounts and request authentication.
// Passwords: Argon2id. Sessions: HS256 JWT bearer tokens, no server-side state.

pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod mailer;
pub mod oauth;
pub mod password;

pub use extractor::AuthUser;
pub use jwt::JwtKeys;
pub use mailer::{LogMailer, Mailer};
pub use oauth::OAuthClient;
