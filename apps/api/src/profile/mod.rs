// Profile: one document per user plus the profile photo upload.
// Image decoding and resizing is CPU-bound and runs inside spawn_blocking.

pub mod handlers;
pub mod models;
pub mod photo;
pub mod storage;
