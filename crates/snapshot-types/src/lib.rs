pub mod api;
pub mod events;
pub mod models;

/// Platform user id (snowflake-style, fits in a signed 64-bit column).
pub type UserId = u64;
