//! Message repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::{NewMessageRequest, TicketMessage};

/// Message repository for database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to a ticket and return its id
    pub async fn create(&self, ticket_id: i32, message: &NewMessageRequest) -> Result<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO ticket_messages (ticket_id, sender_type, sender_id, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(ticket_id)
        .bind(&message.sender_type)
        .bind(message.sender_id)
        .bind(&message.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Conversation of a ticket, oldest first
    pub async fn list_for_ticket(&self, ticket_id: i32) -> Result<Vec<TicketMessage>> {
        let messages = sqlx::query_as::<_, TicketMessage>(
            r#"
            SELECT id, ticket_id, sender_type, sender_id, message, created_at
            FROM ticket_messages
            WHERE ticket_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
