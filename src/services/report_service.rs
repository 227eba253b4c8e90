use crate::auth::Principal;
use crate::error::{AppError, AppResult};
use crate::format::today;
use crate::models::Role;
use crate::reports::{self, AdminOverview, EmployeeBalance, GroupSummary, LedgerTotals, MemberHistory};
use crate::repositories::*;
use crate::services::group_service::ensure_can_view_group;
use crate::validation;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Read-only dashboards; the arithmetic lives in [`crate::reports`]
pub struct ReportService {
    groups: Arc<GroupRepository>,
    users: Arc<UserRepository>,
    employees: Arc<EmployeeRepository>,
    collections: Arc<CollectionRepository>,
    payments: Arc<PaymentRepository>,
    salaries: Arc<SalaryRepository>,
    expenses: Arc<ExpenseRepository>,
    credits: Arc<CreditRepository>,
    auctions: Arc<AuctionRepository>,
}

impl ReportService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        groups: Arc<GroupRepository>,
        users: Arc<UserRepository>,
        employees: Arc<EmployeeRepository>,
        collections: Arc<CollectionRepository>,
        payments: Arc<PaymentRepository>,
        salaries: Arc<SalaryRepository>,
        expenses: Arc<ExpenseRepository>,
        credits: Arc<CreditRepository>,
        auctions: Arc<AuctionRepository>,
    ) -> Self {
        Self {
            groups,
            users,
            employees,
            collections,
            payments,
            salaries,
            expenses,
            credits,
            auctions,
        }
    }

    pub async fn admin_overview(&self, principal: &Principal) -> AppResult<AdminOverview> {
        principal.require(&[Role::Admin])?;

        let (groups, member_count, employee_count) = tokio::try_join!(
            self.groups.list(),
            self.users.count_members(),
            self.employees.count(),
        )?;
        let (collected, paid_out, expenses, salaries) = tokio::try_join!(
            self.collections.total(),
            self.payments.total(),
            self.expenses.total(),
            self.salaries.total(),
        )?;

        let totals = LedgerTotals {
            collected,
            paid_out,
            expenses,
            salaries,
        };
        let overview = reports::admin_overview(&groups, member_count, employee_count, &totals, today());
        debug!(
            "Overview: {} groups ({} active), net {}",
            overview.total_groups, overview.active_groups, overview.net_cash
        );
        Ok(overview)
    }

    pub async fn group_summary(&self, principal: &Principal, group_id: Uuid) -> AppResult<GroupSummary> {
        let group = self
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;
        ensure_can_view_group(principal, &group)?;

        let (collections, auctions) = tokio::try_join!(
            self.collections.list_by_group(group_id),
            self.auctions.list_by_group(group_id),
        )?;

        let mut summary = reports::summarize_group(group, &collections, auctions, today());
        // Members see the group's progress but not each other's payments
        if principal.role == Role::Member {
            let own = principal.username.as_deref().unwrap_or_default();
            summary.member_totals.retain(|m| m.username == own);
        }
        Ok(summary)
    }

    /// Collections and payouts for one member, newest first
    pub async fn member_history(&self, principal: &Principal, username: Option<&str>) -> AppResult<MemberHistory> {
        let username = match (principal.role, username) {
            (Role::Member, None) => principal
                .username
                .clone()
                .ok_or_else(|| AppError::Unauthorized("Member without username".to_string()))?,
            (_, Some(requested)) => validation::username(requested)?,
            (_, None) => return Err(AppError::Validation("Member username is required".to_string())),
        };
        if !principal.can_view_member(&username) {
            return Err(AppError::Forbidden("Members may only view their own history".to_string()));
        }

        let (collections, payments) = tokio::try_join!(
            self.collections.list_by_member(&username),
            self.payments.list_by_member(&username),
        )?;
        Ok(reports::merge_history(collections, payments))
    }

    /// Cash an employee holds: credits received minus credits sent
    pub async fn employee_balance(&self, principal: &Principal, employee_id: Uuid) -> AppResult<EmployeeBalance> {
        if !principal.can_view_employee(employee_id) {
            return Err(AppError::Forbidden("Cannot view this employee's balance".to_string()));
        }
        if self.employees.find_by_id(employee_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Employee {} not found", employee_id)));
        }

        let (totals, collections) = tokio::try_join!(
            self.credits.totals_by_employee(employee_id),
            self.collections.list_by_collector(employee_id),
        )?;
        Ok(reports::employee_balance(employee_id, &totals, &collections))
    }
}
