//! Ticket repository for database operations

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{Pagination, Ticket, TicketPatch, TicketState, ticket::STATUS_OPEN};

const TICKET_COLUMNS: &str =
    "id, user_id, title, description, status, category, created_at, closed_at";

/// Ticket repository for database operations
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an open ticket and return its id
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        category: &str,
    ) -> Result<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO tickets (user_id, title, description, status, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(STATUS_OPEN)
        .bind(category)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Check whether a ticket exists
    pub async fn exists(&self, id: i32) -> Result<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tickets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Find a ticket by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Status and owning user of a ticket
    pub async fn find_state(&self, id: i32) -> Result<Option<TicketState>> {
        let state =
            sqlx::query_as::<_, TicketState>("SELECT status, user_id FROM tickets WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(state)
    }

    /// Get one page of tickets, newest first, optionally filtered by exact
    /// status, together with the total number of matching tickets.
    ///
    /// The page and the count are two separate statements and may disagree
    /// under concurrent writes.
    pub async fn list(
        &self,
        status: Option<&str>,
        pagination: Pagination,
    ) -> Result<(Vec<Ticket>, i64)> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tickets", TICKET_COLUMNS));
        if let Some(status) = status {
            query.push(" WHERE status = ").push_bind(status);
        }
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let tickets = query
            .build_query_as::<Ticket>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets");
        if let Some(status) = status {
            count.push(" WHERE status = ").push_bind(status);
        }
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((tickets, total))
    }

    /// All tickets filed by a user, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE user_id = $1 ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Apply a patch in a single statement. Returns `false` when the patch is
    /// empty and nothing was executed.
    pub async fn update(&self, id: i32, patch: &TicketPatch) -> Result<bool> {
        let Some(mut query) = patch.update_query(id, Utc::now()) else {
            return Ok(false);
        };

        query.build().execute(&self.pool).await?;
        Ok(true)
    }

    /// Delete a ticket together with its photos and messages.
    ///
    /// Runs in one transaction: photos, then messages, then the ticket row.
    /// An error at any step drops the transaction, which rolls everything
    /// back. Returns the file paths of the deleted photo rows.
    pub async fn delete_cascade(&self, id: i32) -> Result<Vec<String>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let file_paths: Vec<String> = sqlx::query_scalar(
            "DELETE FROM ticket_photos WHERE ticket_id = $1 RETURNING file_path",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to delete ticket photos")?;

        sqlx::query("DELETE FROM ticket_messages WHERE ticket_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete ticket messages")?;

        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete ticket")?;

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(file_paths)
    }
}
