//! Authentication: login and role-scoped registration

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    clock::Clock,
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, Session, User},
    repository::Repository,
    services::credentials::CredentialVerifier,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    verifier: CredentialVerifier,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(repository: Repository, config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            verifier: CredentialVerifier::new(config, clock.clone()),
            clock,
        }
    }

    /// The verifier minting and checking this service's credentials; shared
    /// with session stores for lazy expiry re-checks
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Authenticate by username/password and mint a bearer credential.
    ///
    /// The minted token is re-verified against the expected subject before it
    /// is handed out, so the returned session is exactly what the credential
    /// resolves to.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<(String, Session)> {
        let user = self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if !verify_password(&user.password, &request.password)? {
            return Err(AppError::Unauthenticated);
        }

        let token = self.verifier.issue(&user)?;
        let session = self.verifier.verify(&token, Some(&user.username))?;
        tracing::info!(user = %user.username, role = %user.role, "login");
        Ok((token, session))
    }

    pub async fn register_admin(&self, request: RegisterRequest) -> AppResult<(String, User)> {
        self.register(request, Role::Admin).await
    }

    pub async fn register_client(&self, request: RegisterRequest) -> AppResult<(String, User)> {
        self.register(request, Role::Client).await
    }

    pub async fn register_technician(&self, request: RegisterRequest) -> AppResult<(String, User)> {
        self.register(request, Role::Technician).await
    }

    async fn register(&self, request: RegisterRequest, role: Role) -> AppResult<(String, User)> {
        request.validate()?;

        if self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "username {} already exists",
                request.username
            )));
        }

        let user = User {
            id: 0,
            full_name: request.full_name,
            mail: request.mail,
            username: request.username,
            password: hash_password(&request.password)?,
            role,
            phone: request.phone,
            address: request.address,
            joined_date: self.clock.now(),
            avatar_url: request.avatar_url,
            // technicians start out available; the flag stays manual after that
            availability: (role == Role::Technician).then_some(true),
        };
        let user = self.repository.users.insert(user).await?;
        let token = self.verifier.issue(&user)?;
        tracing::info!(user = %user.username, role = %user.role, "registered");
        Ok((token, user))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its stored hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
