//! Repository layer.
//!
//! Repositories wrap the shared [`sea_orm::DatabaseConnection`] and expose
//! the explicit queries the services need; no query leaves this module.

pub mod poll;
pub mod user;

pub use poll::{PollRepository, PollVoteRepository};
pub use user::UserRepository;
