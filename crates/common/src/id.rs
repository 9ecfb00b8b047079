//! ID generation.
//!
//! Every row (users, polls, options, votes) gets a 26-character lowercase
//! ULID minted by the application rather than the database. The timestamp
//! prefix makes ids sort by creation time, which the poll listing leans on
//! for its newest-first order.

use ulid::Ulid;

/// Mints entity ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a fresh id.
    ///
    /// Lowercase so ids survive case-insensitive handling intact. Ids
    /// created in different milliseconds sort in creation order; within a
    /// millisecond the random tail decides.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}
