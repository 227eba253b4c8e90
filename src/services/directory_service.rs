use crate::auth::{self, Principal};
use crate::error::{AppError, AppResult};
use crate::format::normalize_phone;
use crate::models::{Employee, NewEmployee, NewUser, Role, User};
use crate::repositories::{EmployeeRepository, SessionRepository, UserRepository};
use crate::services::audit::{Actor, AuditTrailService};
use crate::validation;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Account management for members, admins and employees
pub struct DirectoryService {
    user_repo: Arc<UserRepository>,
    employee_repo: Arc<EmployeeRepository>,
    session_repo: Arc<SessionRepository>,
    audit: Arc<AuditTrailService>,
}

fn actor(principal: &Principal) -> Actor<'_> {
    Actor {
        id: principal.subject_id,
        role: principal.role.as_str(),
    }
}

impl DirectoryService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        employee_repo: Arc<EmployeeRepository>,
        session_repo: Arc<SessionRepository>,
        audit: Arc<AuditTrailService>,
    ) -> Self {
        Self {
            user_repo,
            employee_repo,
            session_repo,
            audit,
        }
    }

    /// A phone number may belong to one account across both tables
    async fn ensure_phone_free(&self, phone: &str, except: Option<Uuid>) -> AppResult<()> {
        let user = self.user_repo.find_by_phone(phone).await?;
        let employee = self.employee_repo.find_by_phone(phone).await?;
        let taken = user.map(|u| Some(u.id) != except).unwrap_or(false)
            || employee.map(|e| Some(e.id) != except).unwrap_or(false);
        if taken {
            return Err(AppError::BusinessLogic(format!("Phone number {} is already registered", phone)));
        }
        Ok(())
    }

    pub async fn create_user(&self, principal: &Principal, input: NewUser) -> AppResult<User> {
        principal.require(&[Role::Admin])?;

        let name = validation::required(&input.name, "Name")?;
        let username = validation::username(&input.username)?;
        let phone = normalize_phone(&input.phone)?;
        validation::password(&input.password)?;
        if input.role == Role::Employee {
            return Err(AppError::Validation("Employees are created with CreateEmployee".to_string()));
        }

        if self.user_repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::BusinessLogic(format!("Username {} is taken", username)));
        }
        self.ensure_phone_free(&phone, None).await?;

        let address = input.address.as_deref().and_then(validation::optional);
        let user = self
            .user_repo
            .create(
                &name,
                &username,
                &phone,
                &auth::hash_password(&input.password),
                input.role,
                address.as_deref(),
            )
            .await?;

        info!("Created user {} ({})", user.username, user.id);
        self.audit
            .record(
                "user_created",
                Some(actor(principal)),
                serde_json::json!({ "user_id": user.id.to_string(), "username": user.username, "role": user.role }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        Ok(user)
    }

    pub async fn list_users(&self, principal: &Principal, role: Option<Role>) -> AppResult<Vec<User>> {
        principal.require(&[Role::Admin, Role::Employee])?;
        // Employees only need the member directory
        let role = if principal.is_admin() { role } else { Some(Role::Member) };
        Ok(self.user_repo.list(role).await?)
    }

    pub async fn get_user(&self, principal: &Principal, id: Uuid) -> AppResult<User> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if !principal.can_view_member(&user.username) {
            return Err(AppError::Forbidden("Members may only view their own profile".to_string()));
        }
        Ok(user)
    }

    /// Admins edit anyone; members edit themselves
    pub async fn update_user(
        &self,
        principal: &Principal,
        id: Uuid,
        name: &str,
        phone: &str,
        address: &str,
    ) -> AppResult<User> {
        if !principal.is_admin() && principal.subject_id != id {
            return Err(AppError::Forbidden("Cannot edit another user's profile".to_string()));
        }

        let name = validation::required(name, "Name")?;
        let phone = normalize_phone(phone)?;
        self.ensure_phone_free(&phone, Some(id)).await?;

        let address = validation::optional(address);
        let user = self
            .user_repo
            .update_profile(id, &name, &phone, address.as_deref())
            .await?;

        info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn delete_user(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        principal.require(&[Role::Admin])?;
        if principal.subject_id == id {
            return Err(AppError::BusinessLogic("Admins cannot delete their own account".to_string()));
        }

        if !self.user_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        self.session_repo.delete_for_subject(id).await?;

        info!("Deleted user {}", id);
        self.audit
            .record("user_deleted", Some(actor(principal)), serde_json::json!({ "user_id": id.to_string() }))
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(())
    }

    pub async fn create_employee(&self, principal: &Principal, input: NewEmployee) -> AppResult<Employee> {
        principal.require(&[Role::Admin])?;

        let name = validation::required(&input.name, "Name")?;
        let designation = validation::required(&input.designation, "Designation")?;
        let phone = normalize_phone(&input.phone)?;
        validation::password(&input.password)?;
        if input.monthly_salary < Decimal::ZERO {
            return Err(AppError::Validation("Monthly salary cannot be negative".to_string()));
        }
        self.ensure_phone_free(&phone, None).await?;

        let employee = self
            .employee_repo
            .create(
                &name,
                &phone,
                &auth::hash_password(&input.password),
                &designation,
                input.monthly_salary,
            )
            .await?;

        info!("Created employee {} ({})", employee.name, employee.id);
        self.audit
            .record(
                "employee_created",
                Some(actor(principal)),
                serde_json::json!({ "employee_id": employee.id.to_string(), "name": employee.name }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        Ok(employee)
    }

    pub async fn list_employees(&self, principal: &Principal) -> AppResult<Vec<Employee>> {
        principal.require(&[Role::Admin])?;
        Ok(self.employee_repo.list().await?)
    }

    pub async fn get_employee(&self, principal: &Principal, id: Uuid) -> AppResult<Employee> {
        if !principal.can_view_employee(id) {
            return Err(AppError::Forbidden("Cannot view this employee".to_string()));
        }
        self.employee_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    /// Disable login for an employee and end their sessions
    pub async fn deactivate_employee(&self, principal: &Principal, id: Uuid) -> AppResult<Employee> {
        principal.require(&[Role::Admin])?;

        let employee = self.employee_repo.set_active(id, false).await?;
        let ended = self.session_repo.delete_for_subject(id).await?;

        info!("Deactivated employee {} ({} sessions ended)", id, ended);
        self.audit
            .record(
                "employee_deactivated",
                Some(actor(principal)),
                serde_json::json!({ "employee_id": id.to_string() }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        Ok(employee)
    }
}
