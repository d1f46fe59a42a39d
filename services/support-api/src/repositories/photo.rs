//! Photo metadata repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::{NewPhoto, TicketPhoto};

/// Photo repository for database operations
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    /// Create a new photo repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a stored photo and return its id
    pub async fn create(&self, photo: &NewPhoto) -> Result<i32> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO ticket_photos
                (ticket_id, sender_type, sender_id, file_path, file_id, message_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(photo.ticket_id)
        .bind(&photo.sender_type)
        .bind(photo.sender_id)
        .bind(&photo.file_path)
        .bind(&photo.file_id)
        .bind(photo.message_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Path of the stored file behind a photo
    pub async fn find_file_path(&self, id: i32) -> Result<Option<String>> {
        let path = sqlx::query_scalar("SELECT file_path FROM ticket_photos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(path)
    }

    /// Photos attached to a ticket, in no particular order
    pub async fn list_for_ticket(&self, ticket_id: i32) -> Result<Vec<TicketPhoto>> {
        let photos = sqlx::query_as::<_, TicketPhoto>(
            r#"
            SELECT id, ticket_id, sender_type, sender_id, file_path, file_id, message_id, created_at
            FROM ticket_photos
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    /// Delete a photo row. Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ticket_photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
