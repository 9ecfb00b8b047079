//! Business logic services.

#![allow(missing_docs)]

pub mod poll;
pub mod token;
pub mod user;
pub mod vote;

pub use poll::{CreatePollInput, CreatePollOption, PollService, PollWithOptions};
pub use token::{Claims, TokenService};
pub use user::{CreateUserInput, UserService};
pub use vote::{PollResults, VoteService};
