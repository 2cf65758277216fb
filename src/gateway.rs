//! Messaging-gateway boundary types
//!
//! The gateway itself (Telegram, console, test harness) lives outside this
//! crate behind [`crate::runtime::MessagingGateway`]. These are the types that
//! cross that boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a user, as assigned by the delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a delivered prompt, usable to later retract it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRef(pub String);

/// A selectable option attached to an outbound prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOption {
    /// Human-readable label rendered by the gateway.
    pub label: String,
    /// Value delivered back as `InboundEvent::Selection` when pressed.
    pub value: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// An inbound event from the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Free-text message from a user.
    Text { owner: UserId, body: String },
    /// Button press carrying the option value.
    Selection { owner: UserId, value: String },
}

impl InboundEvent {
    /// The user this event belongs to.
    pub fn owner(&self) -> UserId {
        match self {
            InboundEvent::Text { owner, .. } | InboundEvent::Selection { owner, .. } => *owner,
        }
    }
}

/// Delivery failures. The dispatcher logs these and moves on; a failed send
/// never aborts a state transition.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}
