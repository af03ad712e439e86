//! Ticket model and the lifecycle state machine
//!
//! Every legal status change lives in [`transition`]; services never mutate a
//! ticket's status field directly. Wrong source state or wrong actor leaves
//! the ticket untouched and fails with `InvalidTransition`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        breakdown::ReportKey,
        equipment::EquipmentStatus,
        user::{Role, Session},
    },
};

/// Ticket lifecycle states: `Pending -> Repairing -> {Repaired, Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Pending,
    Repairing,
    Repaired,
    Failed,
}

impl TicketStatus {
    /// Repaired and Failed admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Repaired | TicketStatus::Failed)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TicketStatus::Pending => "PENDING",
            TicketStatus::Repairing => "REPAIRING",
            TicketStatus::Repaired => "REPAIRED",
            TicketStatus::Failed => "FAILED",
        };
        write!(f, "{}", label)
    }
}

/// A reported breakdown instance tracked through the repair lifecycle.
/// Tickets are never deleted, only transitioned to a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub description: String,
    pub reporting_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Set if and only if the status is terminal
    pub resolution_date: Option<DateTime<Utc>>,
    pub status: TicketStatus,
    pub client_id: i64,
    /// Unset while Pending and unassigned; set exactly once and immutable
    /// thereafter
    pub technician_id: Option<i64>,
    pub report: ReportKey,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Report-breakdown request (client)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportBreakdown {
    pub equipment_id: i64,
    pub breakdown_id: i64,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Events that drive the ticket lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEvent {
    Assign { technician_id: i64 },
    BeginRepair,
    MarkRepaired,
    MarkFailed,
}

impl std::fmt::Display for TicketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TicketEvent::Assign { .. } => "assign",
            TicketEvent::BeginRepair => "begin repair",
            TicketEvent::MarkRepaired => "mark repaired",
            TicketEvent::MarkFailed => "mark failed",
        };
        write!(f, "{}", label)
    }
}

/// Side effects a transition requires on collaborating entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEffect {
    /// Set the status of the equipment the ticket's report points at
    EquipmentStatus(EquipmentStatus),
}

/// Apply one lifecycle event to a ticket.
///
/// Returns the updated ticket plus the effects the caller must persist, or
/// an error without touching anything. Wrong source state or a technician
/// acting on someone else's ticket fails with `InvalidTransition`; a
/// non-admin attempting `Assign` fails with `Forbidden` instead, since that
/// is an authorization failure rather than a state error. Transitions are
/// idempotent-unsafe: retrying a transition that already succeeded fails
/// because the source state has moved on.
pub fn transition(
    ticket: &Ticket,
    event: TicketEvent,
    actor: &Session,
    now: DateTime<Utc>,
) -> AppResult<(Ticket, Vec<TicketEffect>)> {
    let rejected = AppError::InvalidTransition {
        from: ticket.status,
        event,
        actor: actor.user_id,
    };
    let owned_by_actor =
        actor.role == Role::Technician && ticket.technician_id == Some(actor.user_id);

    let mut next = ticket.clone();
    let effects = match (ticket.status, event) {
        (TicketStatus::Pending, TicketEvent::Assign { technician_id }) => {
            if actor.role != Role::Admin {
                return Err(AppError::Forbidden(
                    "only an admin can assign tickets".to_string(),
                ));
            }
            if ticket.technician_id.is_some() {
                return Err(AppError::IllegalAssignment(
                    "ticket already has a technician".to_string(),
                ));
            }
            next.technician_id = Some(technician_id);
            // Status stays Pending until the technician acts; availability is
            // not cleared either. A technician can therefore hold several
            // pending tickets at once (known policy gap, left to the system
            // owner).
            Vec::new()
        }
        (TicketStatus::Pending, TicketEvent::BeginRepair) => {
            if !owned_by_actor {
                return Err(rejected);
            }
            next.status = TicketStatus::Repairing;
            Vec::new()
        }
        (TicketStatus::Repairing, TicketEvent::MarkRepaired) => {
            if !owned_by_actor {
                return Err(rejected);
            }
            next.status = TicketStatus::Repaired;
            next.resolution_date = Some(now);
            vec![TicketEffect::EquipmentStatus(EquipmentStatus::Available)]
        }
        (TicketStatus::Repairing, TicketEvent::MarkFailed) => {
            if !owned_by_actor {
                return Err(rejected);
            }
            next.status = TicketStatus::Failed;
            next.resolution_date = Some(now);
            vec![TicketEffect::EquipmentStatus(EquipmentStatus::BrokenDown)]
        }
        _ => return Err(rejected),
    };
    next.last_updated = now;
    Ok((next, effects))
}
