use crate::core::error::GchatError;
use async_trait::async_trait;

pub mod gemini;

/// Who a history entry came from. Unrecognized roles from loaded files
/// collapse to `Other` and serialize back as "other".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "user" => Role::User,
            "model" => Role::Model,
            _ => Role::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Transport seam for the forward-to-model call. One attempt per send, no
/// retry; failures carry the transport's own message.
#[async_trait]
pub trait SendMessage: Send + Sync {
    async fn send(&self, history: &[Message], text: &str) -> Result<String, GchatError>;
}
