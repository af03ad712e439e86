//! In-memory store implementations
//!
//! Back the scenario tests and any embedding that brings no external
//! persistence. Ids are assigned sequentially per store.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::{
        breakdown::{Breakdown, BreakdownReport, ReportKey},
        equipment::{Equipment, EquipmentStatus},
        ticket::{Ticket, TicketStatus},
        user::{Role, User},
    },
    repository::{BreakdownStore, EquipmentStore, ReportStore, TicketStore, UserStore},
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: i64) -> AppResult<User> {
        read(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound { kind: EntityKind::User, id })
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(read(&self.rows)
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = read(&self.rows)
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn insert(&self, mut user: User) -> AppResult<User> {
        user.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        write(&self.rows).insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut rows = write(&self.rows);
        if !rows.contains_key(&user.id) {
            return Err(AppError::NotFound { kind: EntityKind::User, id: user.id });
        }
        rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        write(&self.rows)
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound { kind: EntityKind::User, id })
    }
}

#[derive(Default)]
pub struct MemoryEquipmentStore {
    rows: RwLock<HashMap<i64, Equipment>>,
    next_id: AtomicI64,
}

#[async_trait]
impl EquipmentStore for MemoryEquipmentStore {
    async fn get(&self, id: i64) -> AppResult<Equipment> {
        read(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound { kind: EntityKind::Equipment, id })
    }

    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let mut units: Vec<Equipment> = read(&self.rows).values().cloned().collect();
        units.sort_by_key(|e| e.id);
        Ok(units)
    }

    async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<Equipment>> {
        let mut units: Vec<Equipment> = read(&self.rows)
            .values()
            .filter(|e| e.client_id == Some(client_id))
            .cloned()
            .collect();
        units.sort_by_key(|e| e.id);
        Ok(units)
    }

    async fn list_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>> {
        let mut units: Vec<Equipment> = read(&self.rows)
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect();
        units.sort_by_key(|e| e.id);
        Ok(units)
    }

    async fn insert(&self, mut equipment: Equipment) -> AppResult<Equipment> {
        equipment.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        write(&self.rows).insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn save(&self, equipment: &Equipment) -> AppResult<()> {
        let mut rows = write(&self.rows);
        if !rows.contains_key(&equipment.id) {
            return Err(AppError::NotFound { kind: EntityKind::Equipment, id: equipment.id });
        }
        rows.insert(equipment.id, equipment.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        write(&self.rows)
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound { kind: EntityKind::Equipment, id })
    }
}

#[derive(Default)]
pub struct MemoryBreakdownStore {
    rows: RwLock<HashMap<i64, Breakdown>>,
    next_id: AtomicI64,
}

#[async_trait]
impl BreakdownStore for MemoryBreakdownStore {
    async fn get(&self, id: i64) -> AppResult<Breakdown> {
        read(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound { kind: EntityKind::Breakdown, id })
    }

    async fn list(&self) -> AppResult<Vec<Breakdown>> {
        let mut entries: Vec<Breakdown> = read(&self.rows).values().cloned().collect();
        entries.sort_by_key(|b| b.id);
        Ok(entries)
    }

    async fn insert(&self, mut breakdown: Breakdown) -> AppResult<Breakdown> {
        breakdown.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        write(&self.rows).insert(breakdown.id, breakdown.clone());
        Ok(breakdown)
    }

    async fn save(&self, breakdown: &Breakdown) -> AppResult<()> {
        let mut rows = write(&self.rows);
        if !rows.contains_key(&breakdown.id) {
            return Err(AppError::NotFound { kind: EntityKind::Breakdown, id: breakdown.id });
        }
        rows.insert(breakdown.id, breakdown.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        write(&self.rows)
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound { kind: EntityKind::Breakdown, id })
    }
}

#[derive(Default)]
pub struct MemoryReportStore {
    rows: RwLock<HashMap<ReportKey, BreakdownReport>>,
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn get(&self, key: ReportKey) -> AppResult<Option<BreakdownReport>> {
        Ok(read(&self.rows).get(&key).copied())
    }

    async fn insert(&self, report: BreakdownReport) -> AppResult<()> {
        write(&self.rows).insert(report.key, report);
        Ok(())
    }

    async fn list_for_equipment(&self, equipment_id: i64) -> AppResult<Vec<BreakdownReport>> {
        let mut reports: Vec<BreakdownReport> = read(&self.rows)
            .values()
            .filter(|r| r.key.equipment_id == equipment_id)
            .copied()
            .collect();
        reports.sort_by_key(|r| (r.key.equipment_id, r.key.breakdown_id));
        Ok(reports)
    }
}

#[derive(Default)]
pub struct MemoryTicketStore {
    rows: RwLock<HashMap<i64, Ticket>>,
    next_id: AtomicI64,
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn get(&self, id: i64) -> AppResult<Ticket> {
        read(&self.rows)
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound { kind: EntityKind::Ticket, id })
    }

    async fn list(&self) -> AppResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = read(&self.rows).values().cloned().collect();
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }

    async fn list_by_status(&self, status: TicketStatus) -> AppResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = read(&self.rows)
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }

    async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = read(&self.rows)
            .values()
            .filter(|t| t.client_id == client_id)
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }

    async fn list_by_technician(&self, technician_id: i64) -> AppResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = read(&self.rows)
            .values()
            .filter(|t| t.technician_id == Some(technician_id))
            .cloned()
            .collect();
        tickets.sort_by_key(|t| t.id);
        Ok(tickets)
    }

    async fn open_for_report(&self, key: ReportKey) -> AppResult<Option<Ticket>> {
        Ok(read(&self.rows)
            .values()
            .find(|t| t.report == key && t.is_open())
            .cloned())
    }

    async fn insert(&self, mut ticket: Ticket) -> AppResult<Ticket> {
        ticket.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        write(&self.rows).insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn save(&self, ticket: &Ticket) -> AppResult<()> {
        let mut rows = write(&self.rows);
        if !rows.contains_key(&ticket.id) {
            return Err(AppError::NotFound { kind: EntityKind::Ticket, id: ticket.id });
        }
        rows.insert(ticket.id, ticket.clone());
        Ok(())
    }
}
