//! Persistence collaborator contracts
//!
//! Storage lives outside this crate; the core only sees these traits. Every
//! method may fail with `NotFound` or a transport error, both surfaced
//! unchanged to the caller.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        breakdown::{Breakdown, BreakdownReport, ReportKey},
        equipment::{Equipment, EquipmentStatus},
        ticket::{Ticket, TicketStatus},
        user::{Role, User},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<User>;
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>>;
    /// Inserts a new row; the store assigns the id
    async fn insert(&self, user: User) -> AppResult<User>;
    async fn save(&self, user: &User) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Equipment>;
    async fn list(&self) -> AppResult<Vec<Equipment>>;
    async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<Equipment>>;
    async fn list_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>>;
    async fn insert(&self, equipment: Equipment) -> AppResult<Equipment>;
    async fn save(&self, equipment: &Equipment) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BreakdownStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Breakdown>;
    async fn list(&self) -> AppResult<Vec<Breakdown>>;
    async fn insert(&self, breakdown: Breakdown) -> AppResult<Breakdown>;
    async fn save(&self, breakdown: &Breakdown) -> AppResult<()>;
    async fn delete(&self, id: i64) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get(&self, key: ReportKey) -> AppResult<Option<BreakdownReport>>;
    async fn insert(&self, report: BreakdownReport) -> AppResult<()>;
    async fn list_for_equipment(&self, equipment_id: i64) -> AppResult<Vec<BreakdownReport>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Ticket>;
    async fn list(&self) -> AppResult<Vec<Ticket>>;
    async fn list_by_status(&self, status: TicketStatus) -> AppResult<Vec<Ticket>>;
    async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<Ticket>>;
    async fn list_by_technician(&self, technician_id: i64) -> AppResult<Vec<Ticket>>;
    /// The non-terminal ticket attached to this equipment-breakdown link, if
    /// one exists
    async fn open_for_report(&self, key: ReportKey) -> AppResult<Option<Ticket>>;
    /// Inserts a new row; the store assigns the id
    async fn insert(&self, ticket: Ticket) -> AppResult<Ticket>;
    async fn save(&self, ticket: &Ticket) -> AppResult<()>;
}

/// Bundle of collaborator handles threaded through the services
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UserStore>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub breakdowns: Arc<dyn BreakdownStore>,
    pub reports: Arc<dyn ReportStore>,
    pub tickets: Arc<dyn TicketStore>,
}

impl Repository {
    /// Repository backed by the in-memory stores; used by tests and embedded
    /// callers that bring no external persistence
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::default()),
            equipment: Arc::new(memory::MemoryEquipmentStore::default()),
            breakdowns: Arc::new(memory::MemoryBreakdownStore::default()),
            reports: Arc::new(memory::MemoryReportStore::default()),
            tickets: Arc::new(memory::MemoryTicketStore::default()),
        }
    }
}
