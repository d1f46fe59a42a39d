//! Photos attached to tickets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Photo metadata. The file itself lives on disk at `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketPhoto {
    pub id: i32,
    pub ticket_id: i32,
    pub sender_type: String,
    pub sender_id: i64,
    pub file_path: String,
    /// Opaque token used as the stored file name stem
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Metadata of a freshly stored photo
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub ticket_id: i32,
    pub sender_type: String,
    pub sender_id: i64,
    pub file_path: String,
    pub file_id: String,
    pub message_id: Option<i32>,
}
