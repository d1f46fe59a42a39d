//! Repositories for database operations

use anyhow::Result;
use sqlx::PgPool;

use crate::models::{Pagination, User};

pub mod message;
pub mod photo;
pub mod ticket;

pub use message::MessageRepository;
pub use photo::PhotoRepository;
pub use ticket::TicketRepository;

const USER_COLUMNS: &str =
    "id, full_name, phone, location_lat, location_lng, birth_date, is_registered, registered_at";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user with this id exists
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Insert a user with its externally assigned id
    pub async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, phone, location_lat, location_lng, birth_date, is_registered, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.location_lat)
        .bind(user.location_lng)
        .bind(user.birth_date)
        .bind(user.is_registered)
        .bind(user.registered_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get one page of users ordered by id, together with the total count
    pub async fn list(&self, pagination: Pagination) -> Result<(Vec<User>, i64)> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, count))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Overwrite every mutable column of an existing user
    pub async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET full_name = $1, phone = $2, location_lat = $3, location_lng = $4,
                birth_date = $5, is_registered = $6, registered_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.location_lat)
        .bind(user.location_lng)
        .bind(user.birth_date)
        .bind(user.is_registered)
        .bind(user.registered_at)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
