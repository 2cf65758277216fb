//! focusbot - per-user focus session engine
//!
//! Tracks timed work intervals ("focus sessions") tied to user-owned tasks,
//! driven through a turn-based conversational interface. The core is a pure
//! conversation state machine plus a session engine owning one independently
//! cancellable interval timer per user. Delivery channels and credential
//! loading live in the embedding binary, behind the [`runtime::MessagingGateway`]
//! trait.

pub mod db;
pub mod gateway;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod telemetry;
