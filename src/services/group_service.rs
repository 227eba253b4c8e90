use crate::auth::Principal;
use crate::error::{AppError, AppResult};
use crate::format::{check_amount_range, today};
use crate::models::{Group, GroupStatus, NewGroup, Role};
use crate::repositories::{GroupRepository, UserRepository};
use crate::services::audit::{Actor, AuditTrailService};
use crate::validation;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for managing chit groups
pub struct GroupService {
    group_repo: Arc<GroupRepository>,
    user_repo: Arc<UserRepository>,
    audit: Arc<AuditTrailService>,
}

impl GroupService {
    pub fn new(
        group_repo: Arc<GroupRepository>,
        user_repo: Arc<UserRepository>,
        audit: Arc<AuditTrailService>,
    ) -> Self {
        Self {
            group_repo,
            user_repo,
            audit,
        }
    }

    async fn audit_change(&self, principal: &Principal, action: &str, group: &Group) {
        let actor = Actor {
            id: principal.subject_id,
            role: principal.role.as_str(),
        };
        self.audit
            .log_group_changed(actor, action, group)
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
    }

    /// Fetch a group or fail with NotFound
    pub async fn require_group(&self, id: Uuid) -> AppResult<Group> {
        self.group_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))
    }

    /// Every listed member must already have an account
    async fn ensure_members_exist(&self, members: &[String]) -> AppResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let missing = self.user_repo.missing_usernames(members).await?;
        if !missing.is_empty() {
            return Err(AppError::Validation(format!("Unknown members: {}", missing.join(", "))));
        }
        Ok(())
    }

    /// Create a new chit group
    pub async fn create_group(&self, principal: &Principal, input: NewGroup) -> AppResult<Group> {
        principal.require(&[Role::Admin])?;

        let name = validation::required(&input.name, "Group name")?;
        if input.total_amount <= Decimal::ZERO {
            return Err(AppError::Validation("Total amount must be positive".to_string()));
        }
        if input.monthly_installment <= Decimal::ZERO {
            return Err(AppError::Validation("Monthly installment must be positive".to_string()));
        }
        check_amount_range(input.total_amount, "Total amount")?;
        check_amount_range(input.monthly_installment, "Monthly installment")?;
        let duration_months = validation::duration_months(input.duration_months)?;
        let members = validation::member_list(&input.members)?;
        self.ensure_members_exist(&members).await?;

        info!("Creating group: name={}, members={}", name, members.len());

        let group = self
            .group_repo
            .create(&NewGroup {
                name,
                duration_months,
                members,
                ..input
            })
            .await?;

        info!("Created group {} ({})", group.name, group.id);
        self.audit_change(principal, "group_created", &group).await;
        Ok(group)
    }

    /// Admins and employees see every group; members see their own
    pub async fn list_groups(&self, principal: &Principal) -> AppResult<Vec<Group>> {
        match principal.role {
            Role::Admin | Role::Employee => Ok(self.group_repo.list().await?),
            Role::Member => {
                let username = principal
                    .username
                    .as_deref()
                    .ok_or_else(|| AppError::Unauthorized("Member without username".to_string()))?;
                Ok(self.group_repo.list_for_member(username).await?)
            }
        }
    }

    pub async fn get_group(&self, principal: &Principal, id: Uuid) -> AppResult<Group> {
        let group = self.require_group(id).await?;
        ensure_can_view_group(principal, &group)?;
        Ok(group)
    }

    pub async fn add_member(&self, principal: &Principal, id: Uuid, username: &str) -> AppResult<Group> {
        principal.require(&[Role::Admin])?;
        let username = validation::username(username)?;

        let group = self.require_group(id).await?;
        if group.is_closed_on(today()) {
            return Err(AppError::BusinessLogic(format!("Group {} is closed", group.name)));
        }
        if group.has_member(&username) {
            return Err(AppError::BusinessLogic(format!("{} is already a member", username)));
        }
        self.ensure_members_exist(std::slice::from_ref(&username)).await?;

        let group = self.group_repo.add_member(id, &username).await?;
        info!("Added member {} to group {}", username, id);
        self.audit_change(principal, "group_member_added", &group).await;
        Ok(group)
    }

    pub async fn remove_member(&self, principal: &Principal, id: Uuid, username: &str) -> AppResult<Group> {
        principal.require(&[Role::Admin])?;
        let username = validation::username(username)?;

        let group = self.require_group(id).await?;
        if !group.has_member(&username) {
            return Err(AppError::NotFound(format!("{} is not a member of {}", username, group.name)));
        }

        let group = self.group_repo.remove_member(id, &username).await?;
        info!("Removed member {} from group {}", username, id);
        self.audit_change(principal, "group_member_removed", &group).await;
        Ok(group)
    }

    pub async fn close_group(&self, principal: &Principal, id: Uuid) -> AppResult<Group> {
        principal.require(&[Role::Admin])?;

        let group = self.require_group(id).await?;
        if group.status_enum() == GroupStatus::Closed {
            return Err(AppError::BusinessLogic(format!("Group {} is already closed", group.name)));
        }

        let group = self.group_repo.set_status(id, GroupStatus::Closed).await?;
        info!("Closed group {}", id);
        self.audit_change(principal, "group_closed", &group).await;
        Ok(group)
    }
}

/// Members may only look at groups they belong to
pub fn ensure_can_view_group(principal: &Principal, group: &Group) -> AppResult<()> {
    match principal.role {
        Role::Admin | Role::Employee => Ok(()),
        Role::Member => {
            let is_member = principal
                .username
                .as_deref()
                .map(|u| group.has_member(u))
                .unwrap_or(false);
            if is_member {
                Ok(())
            } else {
                Err(AppError::Forbidden("Not a member of this group".to_string()))
            }
        }
    }
}
