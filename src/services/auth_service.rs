use crate::auth::{self, Principal};
use crate::error::{AppError, AppResult};
use crate::format::normalize_phone;
use crate::models::Role;
use crate::repositories::{EmployeeRepository, SessionRepository, UserRepository};
use crate::services::audit::{Actor, AuditTrailService};
use crate::validation;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid phone number or password";

/// Issued on successful login; `token` is shown to the client once
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub principal: Principal,
    pub expires_at: NaiveDateTime,
}

/// When a session issued at `now` stops being valid
fn session_expiry(now: NaiveDateTime, ttl: chrono::Duration) -> AppResult<NaiveDateTime> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AppError::Config("Session lifetime is out of range".to_string()))
}

/// Phone/password login backed by server-side sessions
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    employee_repo: Arc<EmployeeRepository>,
    session_repo: Arc<SessionRepository>,
    audit: Arc<AuditTrailService>,
    session_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        employee_repo: Arc<EmployeeRepository>,
        session_repo: Arc<SessionRepository>,
        audit: Arc<AuditTrailService>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            user_repo,
            employee_repo,
            session_repo,
            audit,
            session_ttl,
        }
    }

    /// Members and admins are looked up first, then employees
    pub async fn login(&self, phone: &str, password: &str) -> AppResult<LoginResult> {
        let phone = normalize_phone(phone)
            .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        // Exactly one password check runs on every path
        let principal = match self.user_repo.find_by_phone(&phone).await? {
            Some(user) => {
                if auth::verify_password(password, &user.password_hash) {
                    Some(Principal {
                        subject_id: user.id,
                        role: user.role_enum(),
                        name: user.name,
                        username: Some(user.username),
                    })
                } else {
                    None
                }
            }
            None => match self.employee_repo.find_by_phone(&phone).await? {
                Some(employee) => {
                    let matches = auth::verify_password(password, &employee.password_hash);
                    if matches && employee.active {
                        Some(Principal {
                            subject_id: employee.id,
                            role: Role::Employee,
                            name: employee.name,
                            username: None,
                        })
                    } else {
                        None
                    }
                }
                None => {
                    auth::verify_password(password, auth::DUMMY_PASSWORD_HASH);
                    None
                }
            },
        }
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let token = auth::generate_session_token();
        let expires_at = session_expiry(chrono::Utc::now().naive_utc(), self.session_ttl)?;
        self.session_repo
            .create(
                &auth::hash_session_token(&token),
                principal.subject_id,
                principal.role,
                expires_at,
            )
            .await?;

        info!("Login: {} ({})", principal.subject_id, principal.role.as_str());
        self.audit
            .log_login(Actor {
                id: principal.subject_id,
                role: principal.role.as_str(),
            })
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        Ok(LoginResult {
            token,
            principal,
            expires_at,
        })
    }

    /// Resolve a bearer token to the caller
    pub async fn authenticate(&self, token: &str) -> AppResult<Principal> {
        let now = chrono::Utc::now().naive_utc();
        let session = self
            .session_repo
            .find_valid(&auth::hash_session_token(token), now)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        let role = session
            .role_enum()
            .ok_or_else(|| AppError::Unauthorized("Session has an unknown role".to_string()))?;

        // The account may have changed since login
        let principal = match role {
            Role::Employee => self
                .employee_repo
                .find_by_id(session.subject_id)
                .await?
                .filter(|e| e.active)
                .map(|e| Principal {
                    subject_id: e.id,
                    role: Role::Employee,
                    name: e.name,
                    username: None,
                }),
            Role::Admin | Role::Member => self
                .user_repo
                .find_by_id(session.subject_id)
                .await?
                .map(|u| Principal {
                    subject_id: u.id,
                    role: u.role_enum(),
                    name: u.name,
                    username: Some(u.username),
                }),
        };

        principal.ok_or_else(|| AppError::Unauthorized("Account no longer active".to_string()))
    }

    pub async fn logout(&self, token: &str) -> AppResult<bool> {
        Ok(self.session_repo.delete(&auth::hash_session_token(token)).await?)
    }

    /// Change the caller's own password; every session of the account ends
    pub async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        validation::password(new_password)?;

        let stored = match principal.role {
            Role::Employee => self
                .employee_repo
                .find_by_id(principal.subject_id)
                .await?
                .map(|e| e.password_hash),
            Role::Admin | Role::Member => self
                .user_repo
                .find_by_id(principal.subject_id)
                .await?
                .map(|u| u.password_hash),
        }
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        if !auth::verify_password(current_password, &stored) {
            return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
        }

        let new_hash = auth::hash_password(new_password);
        match principal.role {
            Role::Employee => self.employee_repo.update_password(principal.subject_id, &new_hash).await?,
            Role::Admin | Role::Member => self.user_repo.update_password(principal.subject_id, &new_hash).await?,
        };
        self.session_repo.delete_for_subject(principal.subject_id).await?;

        info!("Password changed for {}", principal.subject_id);
        Ok(())
    }

    /// Remove expired sessions, returning how many were deleted
    pub async fn purge_expired_sessions(&self) -> AppResult<u64> {
        Ok(self
            .session_repo
            .purge_expired(chrono::Utc::now().naive_utc())
            .await?)
    }
}
