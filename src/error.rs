//! Error types for the support desk core

use thiserror::Error;

use crate::models::ticket::{TicketEvent, TicketStatus};

/// Entity kinds a lookup can fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Client,
    Technician,
    Equipment,
    Breakdown,
    Report,
    Ticket,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::User => "user",
            EntityKind::Client => "client",
            EntityKind::Technician => "technician",
            EntityKind::Equipment => "equipment",
            EntityKind::Breakdown => "breakdown",
            EntityKind::Report => "report",
            EntityKind::Ticket => "ticket",
        };
        write!(f, "{}", label)
    }
}

/// Main application error type
///
/// Every error is terminal for the current operation; nothing is retried
/// internally and no partial mutation precedes a failing guard.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("invalid transition: {event} from {from} by user {actor}")]
    InvalidTransition {
        from: TicketStatus,
        event: TicketEvent,
        actor: i64,
    },

    #[error("illegal assignment: {0}")]
    IllegalAssignment(String),

    #[error("credential expired")]
    Expired,

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("credential subject does not match the expected identity")]
    IdentityMismatch,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        AppError::NotFound { kind, id }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
