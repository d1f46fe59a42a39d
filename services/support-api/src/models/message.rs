//! Ticket conversation messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require_id, require_text};

/// Message posted to a ticket by its owner or by support staff
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketMessage {
    pub id: i32,
    pub ticket_id: i32,
    /// `user` or `support`
    pub sender_type: String,
    pub sender_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Request for posting a message
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessageRequest {
    pub sender_type: String,
    pub sender_id: i64,
    pub message: String,
}

impl NewMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.sender_type, "sender_type")?;
        require_id(self.sender_id, "sender_id")?;
        require_text(&self.message, "message")
    }
}
