pub mod error;
pub mod events;
pub mod middleware;
pub mod state;
pub mod users;
