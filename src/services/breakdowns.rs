//! Breakdown catalog service (admin-only writes)

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        breakdown::{Breakdown, CreateBreakdown, UpdateBreakdown},
        user::Session,
    },
    repository::Repository,
    services::require_admin,
};

#[derive(Clone)]
pub struct BreakdownsService {
    repository: Repository,
}

impl BreakdownsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, actor: &Session, request: CreateBreakdown) -> AppResult<Breakdown> {
        require_admin(actor)?;
        request.validate()?;
        let breakdown = Breakdown {
            id: 0,
            name: request.name,
            description: request.description,
            priority: request.priority,
            kind: request.kind,
        };
        self.repository.breakdowns.insert(breakdown).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Breakdown> {
        self.repository.breakdowns.get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Breakdown>> {
        self.repository.breakdowns.list().await
    }

    pub async fn update(
        &self,
        actor: &Session,
        id: i64,
        changes: UpdateBreakdown,
    ) -> AppResult<Breakdown> {
        require_admin(actor)?;
        let mut breakdown = self.repository.breakdowns.get(id).await?;
        if let Some(name) = changes.name {
            breakdown.name = name;
        }
        if let Some(description) = changes.description {
            breakdown.description = description;
        }
        if let Some(priority) = changes.priority {
            breakdown.priority = priority;
        }
        if let Some(kind) = changes.kind {
            breakdown.kind = kind;
        }
        self.repository.breakdowns.save(&breakdown).await?;
        Ok(breakdown)
    }

    pub async fn delete(&self, actor: &Session, id: i64) -> AppResult<()> {
        require_admin(actor)?;
        self.repository.breakdowns.get(id).await?;
        self.repository.breakdowns.delete(id).await
    }
}
