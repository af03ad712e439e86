//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::user::{Role, Session, UpdateUser, User},
    repository::Repository,
    services::{require_admin, require_user_in_role},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.repository.users.get(id).await
    }

    pub async fn list_admins(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_by_role(Role::Admin).await
    }

    pub async fn list_clients(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_by_role(Role::Client).await
    }

    pub async fn list_technicians(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_by_role(Role::Technician).await
    }

    /// Technicians whose availability flag is on. The flag is toggled
    /// manually and does not track pending workload.
    pub async fn available_technicians(&self) -> AppResult<Vec<User>> {
        let technicians = self.repository.users.list_by_role(Role::Technician).await?;
        Ok(technicians
            .into_iter()
            .filter(|t| t.is_available_technician())
            .collect())
    }

    /// Update a user's profile fields (admin)
    pub async fn update(&self, actor: &Session, id: i64, changes: UpdateUser) -> AppResult<User> {
        require_admin(actor)?;
        changes.validate()?;

        let mut user = self.repository.users.get(id).await?;
        if let Some(ref username) = changes.username {
            let taken = self.repository.users.get_by_username(username).await?;
            if taken.map(|u| u.id != id).unwrap_or(false) {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
            user.username = username.clone();
        }
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(mail) = changes.mail {
            user.mail = mail;
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = changes.address {
            user.address = Some(address);
        }
        if let Some(avatar_url) = changes.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        self.repository.users.save(&user).await?;
        Ok(user)
    }

    /// Delete a user (admin)
    pub async fn delete(&self, actor: &Session, id: i64) -> AppResult<()> {
        require_admin(actor)?;
        self.repository.users.delete(id).await
    }

    /// Toggle a technician's availability flag. Allowed for admins and for
    /// the technician themself.
    pub async fn set_availability(
        &self,
        actor: &Session,
        technician_id: i64,
        available: bool,
    ) -> AppResult<User> {
        if actor.role != Role::Admin && actor.user_id != technician_id {
            return Err(AppError::Forbidden(
                "only an admin or the technician can toggle availability".to_string(),
            ));
        }
        let mut technician = require_user_in_role(
            &self.repository,
            technician_id,
            Role::Technician,
            EntityKind::Technician,
        )
        .await?;
        technician.availability = Some(available);
        self.repository.users.save(&technician).await?;
        Ok(technician)
    }
}
