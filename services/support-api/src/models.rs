//! Domain records and request/response payloads

pub mod message;
pub mod pagination;
pub mod photo;
pub mod ticket;
pub mod user;

pub use message::{NewMessageRequest, TicketMessage};
pub use pagination::{ListQuery, Pagination};
pub use photo::{NewPhoto, TicketPhoto};
pub use ticket::{
    NewTicketRequest, Ticket, TicketDetailResponse, TicketListResponse, TicketPatch, TicketState,
    UpdateTicketRequest,
};
pub use user::{NewUserRequest, UpdateUserRequest, User, UserDetailResponse, UserListResponse};

/// Reject an empty or whitespace-only required text field
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Field '{}' is required", field));
    }
    Ok(())
}

/// Reject a missing (zero) required identifier
pub(crate) fn require_id(value: i64, field: &str) -> Result<(), String> {
    if value == 0 {
        return Err(format!("Field '{}' is required", field));
    }
    Ok(())
}
