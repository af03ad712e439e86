//! Business logic services

pub mod auth;
pub mod breakdowns;
pub mod credentials;
pub mod equipment;
pub mod policy;
pub mod session;
pub mod tickets;
pub mod users;

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::AuthConfig,
    error::{AppError, AppResult, EntityKind},
    models::user::{Role, Session, User},
    repository::Repository,
};

/// Container for the repository-backed services. The session store and the
/// resource tree are plain values owned by the caller and are not bundled
/// here.
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub breakdowns: breakdowns::BreakdownsService,
    pub tickets: tickets::TicketsService,
}

impl Services {
    /// Create all services with the given repository and clock
    pub fn new(repository: Repository, config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config, clock.clone()),
            users: users::UsersService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            breakdowns: breakdowns::BreakdownsService::new(repository.clone()),
            tickets: tickets::TicketsService::new(repository, clock),
        }
    }
}

/// Require administrator privileges on the acting session
pub(crate) fn require_admin(actor: &Session) -> AppResult<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Administrator privileges required".to_string(),
        ))
    }
}

/// Fetch a user that must hold the given role; a user of any other role is
/// reported as the role-specific kind not being found
pub(crate) async fn require_user_in_role(
    repository: &Repository,
    id: i64,
    role: Role,
    kind: EntityKind,
) -> AppResult<User> {
    match repository.users.get(id).await {
        Ok(user) if user.role == role => Ok(user),
        Ok(_) => Err(AppError::NotFound { kind, id }),
        Err(AppError::NotFound { .. }) => Err(AppError::NotFound { kind, id }),
        Err(e) => Err(e),
    }
}
