//! Storage collaborators.
//!
//! - [`traits`] - repository traits the auth core depends on
//! - [`memory`] - in-memory implementations for development and tests

pub mod memory;
pub mod traits;

pub use memory::{InMemorySessionStore, InMemoryUserStore};
pub use traits::{NewUser, SessionQuery, SessionRepository, UserRecord, UserRepository};
