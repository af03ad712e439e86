//! Ticket lifecycle orchestration
//!
//! Loads fresh entity snapshots, runs the guards and the pure transition in
//! [`crate::models::ticket`], and only then writes through the persistence
//! collaborators. Every guard failure leaves all entities untouched.

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult, EntityKind},
    models::{
        breakdown::{BreakdownReport, ReportKey},
        equipment::{Equipment, EquipmentStatus},
        ticket::{self, ReportBreakdown, Ticket, TicketEffect, TicketEvent, TicketStatus},
        user::{Role, Session},
    },
    repository::Repository,
    services::require_user_in_role,
};

#[derive(Clone)]
pub struct TicketsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl TicketsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Report a breakdown on an owned unit (client), opening a Pending
    /// ticket.
    ///
    /// Resolves the equipment-breakdown link (creating it on first
    /// occurrence), refuses units the client does not own, out-of-service
    /// units and links that already have an open ticket, then marks the unit
    /// broken down.
    pub async fn report_breakdown(
        &self,
        actor: &Session,
        request: ReportBreakdown,
    ) -> AppResult<Ticket> {
        request.validate()?;
        if actor.role != Role::Client {
            return Err(AppError::Forbidden(
                "only a client can report a breakdown".to_string(),
            ));
        }

        let mut equipment = self.repository.equipment.get(request.equipment_id).await?;
        if equipment.client_id != Some(actor.user_id) {
            return Err(AppError::IllegalAssignment(
                "equipment is not owned by the reporting client".to_string(),
            ));
        }
        if equipment.status == EquipmentStatus::OutOfService {
            return Err(AppError::IllegalAssignment(
                "equipment is out of service".to_string(),
            ));
        }
        self.repository.breakdowns.get(request.breakdown_id).await?;

        let key = ReportKey {
            equipment_id: request.equipment_id,
            breakdown_id: request.breakdown_id,
        };
        if let Some(open) = self.repository.tickets.open_for_report(key).await? {
            return Err(AppError::IllegalAssignment(format!(
                "ticket {} is still open for {}",
                open.id, key
            )));
        }
        if self.repository.reports.get(key).await?.is_none() {
            self.repository
                .reports
                .insert(BreakdownReport { key })
                .await?;
        }

        equipment.status = EquipmentStatus::BrokenDown;
        self.repository.equipment.save(&equipment).await?;

        let now = self.clock.now();
        let ticket = Ticket {
            id: 0,
            description: request.description,
            reporting_date: now,
            last_updated: now,
            resolution_date: None,
            status: TicketStatus::Pending,
            client_id: actor.user_id,
            technician_id: None,
            report: key,
        };
        let ticket = self.repository.tickets.insert(ticket).await?;
        tracing::info!(ticket = ticket.id, report = %key, "breakdown reported");
        Ok(ticket)
    }

    /// Assign a pending ticket to an available technician (admin).
    ///
    /// Sets the technician only: the ticket stays Pending until the
    /// technician acts, and the availability flag is not cleared, so one
    /// technician can accumulate several pending tickets. Both are the
    /// observed source behavior, kept as a policy decision for the system
    /// owner rather than silently changed.
    pub async fn assign_to_technician(
        &self,
        actor: &Session,
        ticket_id: i64,
        technician_id: i64,
    ) -> AppResult<Ticket> {
        let ticket = self.repository.tickets.get(ticket_id).await?;
        let technician = require_user_in_role(
            &self.repository,
            technician_id,
            Role::Technician,
            EntityKind::Technician,
        )
        .await?;
        if !technician.is_available_technician() {
            return Err(AppError::IllegalAssignment(format!(
                "technician {} is not available",
                technician_id
            )));
        }

        let event = TicketEvent::Assign { technician_id };
        let (next, _) = ticket::transition(&ticket, event, actor, self.clock.now())?;
        self.repository.tickets.save(&next).await?;
        tracing::info!(ticket = next.id, technician = technician_id, "ticket assigned");
        Ok(next)
    }

    /// Pending -> Repairing, by the assigned technician
    pub async fn begin_repair(&self, actor: &Session, ticket_id: i64) -> AppResult<Ticket> {
        // the technician must still be flagged available to take up work
        let technician = require_user_in_role(
            &self.repository,
            actor.user_id,
            Role::Technician,
            EntityKind::Technician,
        )
        .await?;
        if !technician.is_available_technician() {
            return Err(AppError::IllegalAssignment(format!(
                "technician {} is not available",
                actor.user_id
            )));
        }
        self.apply(actor, ticket_id, TicketEvent::BeginRepair).await
    }

    /// Repairing -> Repaired; frees the equipment
    pub async fn mark_repaired(&self, actor: &Session, ticket_id: i64) -> AppResult<Ticket> {
        self.apply(actor, ticket_id, TicketEvent::MarkRepaired).await
    }

    /// Repairing -> Failed; the equipment stays broken down
    pub async fn mark_failed(&self, actor: &Session, ticket_id: i64) -> AppResult<Ticket> {
        self.apply(actor, ticket_id, TicketEvent::MarkFailed).await
    }

    async fn apply(
        &self,
        actor: &Session,
        ticket_id: i64,
        event: TicketEvent,
    ) -> AppResult<Ticket> {
        let ticket = self.repository.tickets.get(ticket_id).await?;
        let (next, effects) = ticket::transition(&ticket, event, actor, self.clock.now())?;

        // resolve effect targets before the first write so a missing
        // collaborator row cannot leave a half-applied transition
        let mut equipment_update: Option<Equipment> = None;
        for effect in &effects {
            match effect {
                TicketEffect::EquipmentStatus(status) => {
                    let mut equipment = self
                        .repository
                        .equipment
                        .get(next.report.equipment_id)
                        .await?;
                    equipment.status = *status;
                    equipment_update = Some(equipment);
                }
            }
        }

        self.repository.tickets.save(&next).await?;
        if let Some(equipment) = equipment_update {
            self.repository.equipment.save(&equipment).await?;
        }
        tracing::info!(ticket = next.id, status = %next.status, "ticket transitioned");
        Ok(next)
    }

    pub async fn get(&self, id: i64) -> AppResult<Ticket> {
        self.repository.tickets.get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Ticket>> {
        self.repository.tickets.list().await
    }

    pub async fn pending(&self) -> AppResult<Vec<Ticket>> {
        self.repository
            .tickets
            .list_by_status(TicketStatus::Pending)
            .await
    }

    pub async fn by_client(&self, client_id: i64) -> AppResult<Vec<Ticket>> {
        self.repository.tickets.list_by_client(client_id).await
    }

    pub async fn by_technician(&self, technician_id: i64) -> AppResult<Vec<Ticket>> {
        self.repository
            .tickets
            .list_by_technician(technician_id)
            .await
    }

    /// Tickets the technician currently has under repair
    pub async fn repairing_for(&self, technician_id: i64) -> AppResult<Vec<Ticket>> {
        let tickets = self
            .repository
            .tickets
            .list_by_status(TicketStatus::Repairing)
            .await?;
        Ok(tickets
            .into_iter()
            .filter(|t| t.technician_id == Some(technician_id))
            .collect())
    }
}
