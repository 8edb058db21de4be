//! Message types
//!
//! Defines chat message structures and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply streamed back by the model
    Assistant,
}

impl Role {
    /// Short prefix used when rendering a transcript line
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "bot",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content of the message
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// An empty assistant reply waiting for fragments
    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }
}
