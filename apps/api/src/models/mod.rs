pub mod career;
pub mod user;
