//! Ticket notifications for the external messaging service
//!
//! Handlers enqueue notifications through a cloneable [`Notifier`]; a single
//! [`NotificationWorker`] task owns the receiving end of a bounded queue and
//! delivers them one by one. Enqueueing never waits: with a full queue the
//! notification is dropped with a warning. Delivery failures are logged and
//! never retried. Once every `Notifier` is dropped the worker drains what is
//! left in the queue and exits.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{config::NotificationConfig, models::TicketPatch};

/// How the four notification fields are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// `application/x-www-form-urlencoded` request body
    Form,
    /// URL query string with an empty body
    Query,
}

/// One outbound call to the messaging service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub endpoint: String,
    pub delivery: Delivery,
    pub super_connect_token: String,
    pub sender_id: String,
    pub accepter_id: String,
    pub message: String,
}

impl Notification {
    /// Field pairs in the shape the messaging service expects
    pub fn params(&self) -> [(&'static str, &str); 4] {
        [
            ("super_connect_token", self.super_connect_token.as_str()),
            ("sender_id", self.sender_id.as_str()),
            ("message", self.message.as_str()),
            ("accepter_id", self.accepter_id.as_str()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response status {0}")]
    Status(StatusCode),
}

/// Producer handle for the notification queue
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
    config: NotificationConfig,
}

impl Notifier {
    /// Build the queue and the worker that consumes it
    pub fn channel(config: &NotificationConfig) -> Result<(Notifier, NotificationWorker)> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build notification HTTP client")?;

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

        let notifier = Notifier {
            tx,
            config: config.clone(),
        };
        let worker = NotificationWorker { rx, client };

        Ok((notifier, worker))
    }

    /// Queue a notification without waiting
    pub fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(n)) => {
                warn!(accepter_id = %n.accepter_id, "Notification queue full, dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                warn!(accepter_id = %n.accepter_id, "Notification worker stopped, dropping notification");
            }
        }
    }

    /// Tell the ticket owner their ticket changed
    pub fn ticket_updated(&self, ticket_id: i32, owner_id: i64, patch: &TicketPatch) {
        self.notify(self.owner_notification(owner_id, patch.notification_text(ticket_id)));
    }

    /// Tell the ticket owner, and support staff when configured, about a new message
    pub fn message_added(&self, ticket_id: i32, owner_id: i64, message: &str) {
        self.notify(self.owner_notification(
            owner_id,
            format!("В вашем тиките {} обновление{}", ticket_id, message),
        ));

        if let Some(endpoint) = &self.config.staff_endpoint {
            self.notify(Notification {
                endpoint: endpoint.clone(),
                delivery: Delivery::Query,
                super_connect_token: self.config.super_connect_token.clone(),
                sender_id: self.config.sender_id.clone(),
                accepter_id: self.config.staff_accepter_id.clone(),
                message: format!("По вашему тикету {} пришло новое сообщение", ticket_id),
            });
        }
    }

    fn owner_notification(&self, owner_id: i64, message: String) -> Notification {
        Notification {
            endpoint: self.config.endpoint.clone(),
            delivery: Delivery::Form,
            super_connect_token: self.config.super_connect_token.clone(),
            sender_id: self.config.sender_id.clone(),
            accepter_id: owner_id.to_string(),
            message,
        }
    }
}

/// Consumer of the notification queue
pub struct NotificationWorker {
    rx: mpsc::Receiver<Notification>,
    client: Client,
}

impl NotificationWorker {
    /// Run the worker on the Tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Deliver notifications until every [`Notifier`] is dropped and the
    /// queue is empty
    pub async fn run(mut self) {
        info!("Notification worker started");

        while let Some(notification) = self.rx.recv().await {
            match self.deliver(&notification).await {
                Ok(()) => debug!(
                    endpoint = %notification.endpoint,
                    accepter_id = %notification.accepter_id,
                    "Notification delivered"
                ),
                Err(e) => error!(
                    endpoint = %notification.endpoint,
                    accepter_id = %notification.accepter_id,
                    error = %e,
                    "Failed to send notification"
                ),
            }
        }

        info!("Notification worker stopped");
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        let params = notification.params();
        let request = self.client.post(&notification.endpoint);
        let request = match notification.delivery {
            Delivery::Form => request.form(&params),
            Delivery::Query => request
                .query(&params)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(NotificationError::Status(response.status()));
        }

        Ok(())
    }
}

/// Wait for the worker to drain the queue, giving up after `timeout`
pub async fn drain(handle: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => info!("Notification queue drained"),
        Ok(Err(e)) => error!(error = %e, "Notification worker panicked"),
        Err(_) => warn!(
            "Notification queue not drained after {:?}, pending notifications are lost",
            timeout
        ),
    }
}
