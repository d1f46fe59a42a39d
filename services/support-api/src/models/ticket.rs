//! Ticket records, requests and the typed update patch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{TicketMessage, TicketPhoto, require_id, require_text};

/// Status every ticket is created with
pub const STATUS_OPEN: &str = "открыт";

/// Status that closes a ticket and blocks new messages
pub const STATUS_CLOSED: &str = "закрыт";

/// Category used when the request does not name one
pub const DEFAULT_CATEGORY: &str = "спросить";

/// Support ticket
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i32,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// The parts of a ticket that gate updates and new messages
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TicketState {
    pub status: String,
    pub user_id: i64,
}

impl TicketState {
    pub fn is_closed(&self) -> bool {
        self.status == STATUS_CLOSED
    }
}

/// Request for ticket creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicketRequest {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewTicketRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_id(self.user_id, "user_id")?;
        require_text(&self.title, "title")?;
        require_text(&self.description, "description")
    }

    /// Requested category, or [`DEFAULT_CATEGORY`] when empty
    pub fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// Request for ticket update. Empty strings mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Fields of a ticket to change in one statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl From<UpdateTicketRequest> for TicketPatch {
    fn from(request: UpdateTicketRequest) -> Self {
        Self {
            status: request.status.filter(|s| !s.is_empty()),
            category: request.category.filter(|c| !c.is_empty()),
        }
    }
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.category.is_none()
    }

    /// Whether applying the patch moves the ticket to [`STATUS_CLOSED`]
    pub fn closes_ticket(&self) -> bool {
        self.status.as_deref() == Some(STATUS_CLOSED)
    }

    /// Build the parameterized `UPDATE` for ticket `id`, or `None` when there
    /// is nothing to change. Closing a ticket stamps `closed_at` with `now`.
    pub fn update_query(
        &self,
        id: i32,
        now: DateTime<Utc>,
    ) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_empty() {
            return None;
        }

        let mut builder = QueryBuilder::new("UPDATE tickets SET ");
        let mut fields = builder.separated(", ");

        if let Some(status) = &self.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.clone());

            if self.closes_ticket() {
                fields.push("closed_at = ");
                fields.push_bind_unseparated(now);
            }
        }

        if let Some(category) = &self.category {
            fields.push("category = ");
            fields.push_bind_unseparated(category.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        Some(builder)
    }

    /// Text sent to the ticket owner once the patch is applied
    pub fn notification_text(&self, ticket_id: i32) -> String {
        match &self.status {
            Some(status) => format!("Статус вашего тикета {} изменен на '{}'", ticket_id, status),
            None => format!("Ваш тикет {} был обновлен", ticket_id),
        }
    }
}

/// Response for ticket listing with pagination
#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    pub tickets: Vec<Ticket>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Ticket with its conversation and attachments
#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub ticket: Ticket,
    pub messages: Vec<TicketMessage>,
    pub photos: Vec<TicketPhoto>,
}
