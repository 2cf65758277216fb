//! Runtime for driving user conversations
//!
//! Glue between the pure conversation state machine, the session engine and
//! the external collaborators (task store, messaging gateway).

mod dispatcher;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use dispatcher::Dispatcher;
pub use traits::*;

/// Type alias for the production dispatcher backed by SQLite.
pub type SqliteDispatcher<G> = Dispatcher<SqliteTaskStore, G>;
