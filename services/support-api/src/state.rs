//! Application state shared across handlers

use sqlx::PgPool;

use crate::{
    notifications::Notifier,
    repositories::{MessageRepository, PhotoRepository, TicketRepository, UserRepository},
    storage::PhotoStorage,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub ticket_repository: TicketRepository,
    pub message_repository: MessageRepository,
    pub photo_repository: PhotoRepository,
    pub photo_storage: PhotoStorage,
    pub notifier: Notifier,
}

impl AppState {
    /// Wire every repository to the same pool
    pub fn new(pool: PgPool, photo_storage: PhotoStorage, notifier: Notifier) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            ticket_repository: TicketRepository::new(pool.clone()),
            message_repository: MessageRepository::new(pool.clone()),
            photo_repository: PhotoRepository::new(pool.clone()),
            db_pool: pool,
            photo_storage,
            notifier,
        }
    }
}
