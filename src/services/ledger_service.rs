use crate::auth::Principal;
use crate::error::{AppError, AppResult};
use crate::format::{check_amount_range, today};
use crate::models::*;
use crate::repositories::*;
use crate::services::audit::{Actor, AuditTrailService};
use crate::services::group_service::ensure_can_view_group;
use crate::services::notification::{
    auction_result_message, collection_receipt_message, NotificationOutcome, NotificationService,
};
use crate::validation;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Optional narrowing for list operations
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub group_id: Option<Uuid>,
    pub member_username: Option<String>,
    pub employee_id: Option<Uuid>,
}

/// Repositories the ledger writes to
pub struct LedgerRepositories {
    pub groups: Arc<GroupRepository>,
    pub users: Arc<UserRepository>,
    pub employees: Arc<EmployeeRepository>,
    pub collections: Arc<CollectionRepository>,
    pub payments: Arc<PaymentRepository>,
    pub salaries: Arc<SalaryRepository>,
    pub expenses: Arc<ExpenseRepository>,
    pub credits: Arc<CreditRepository>,
    pub auctions: Arc<AuctionRepository>,
}

/// Records money movements: collections, payouts, salaries, expenses,
/// employee cash credits and auction results
pub struct LedgerService {
    repos: LedgerRepositories,
    notifier: Arc<NotificationService>,
    audit: Arc<AuditTrailService>,
}

fn actor(principal: &Principal) -> Actor<'_> {
    Actor {
        id: principal.subject_id,
        role: principal.role.as_str(),
    }
}

fn ensure_positive(amount: Decimal, field: &str) -> AppResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(format!("{} must be positive", field)));
    }
    check_amount_range(amount, field)
}

impl LedgerService {
    pub fn new(
        repos: LedgerRepositories,
        notifier: Arc<NotificationService>,
        audit: Arc<AuditTrailService>,
    ) -> Self {
        Self {
            repos,
            notifier,
            audit,
        }
    }

    async fn require_group(&self, id: Uuid) -> AppResult<Group> {
        self.repos
            .groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))
    }

    async fn require_employee(&self, id: Uuid) -> AppResult<Employee> {
        self.repos
            .employees
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    /// Username a member is restricted to, or the requested one for staff
    fn scoped_member(principal: &Principal, requested: Option<String>) -> AppResult<Option<String>> {
        match principal.role {
            Role::Member => {
                let own = principal
                    .username
                    .clone()
                    .ok_or_else(|| AppError::Unauthorized("Member without username".to_string()))?;
                match requested {
                    Some(other) if other != own => {
                        Err(AppError::Forbidden("Members may only view their own records".to_string()))
                    }
                    _ => Ok(Some(own)),
                }
            }
            Role::Admin | Role::Employee => Ok(requested),
        }
    }

    /// Employee a non-admin is restricted to
    fn scoped_employee(principal: &Principal, requested: Option<Uuid>) -> AppResult<Option<Uuid>> {
        match principal.role {
            Role::Admin => Ok(requested),
            Role::Employee => match requested {
                Some(other) if other != principal.subject_id => {
                    Err(AppError::Forbidden("Employees may only view their own records".to_string()))
                }
                _ => Ok(Some(principal.subject_id)),
            },
            Role::Member => Err(AppError::Forbidden("Members cannot view staff records".to_string())),
        }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Record an installment; receipt number is allocated atomically.
    ///
    /// With `notify`, the member gets a receipt by SMS and WhatsApp. A failed
    /// notification is logged and never undoes the recording.
    pub async fn record_collection(
        &self,
        principal: &Principal,
        mut input: NewCollection,
        notify: bool,
    ) -> AppResult<(CollectionRecord, Option<NotificationOutcome>)> {
        principal.require(&[Role::Admin, Role::Employee])?;
        ensure_positive(input.amount, "Amount")?;
        input.member_username = validation::username(&input.member_username)?;
        input.note = input.note.as_deref().and_then(validation::optional);

        let group = self.require_group(input.group_id).await?;
        if group.is_closed_on(today()) {
            return Err(AppError::BusinessLogic(format!("Group {} is closed", group.name)));
        }
        if !group.has_member(&input.member_username) {
            return Err(AppError::Validation(format!(
                "{} is not a member of {}",
                input.member_username, group.name
            )));
        }

        // Employees always record under their own name
        if principal.role == Role::Employee {
            input.collected_by = Some(principal.subject_id);
        } else if let Some(collector) = input.collected_by {
            self.require_employee(collector).await?;
        }

        let record = self.repos.collections.create(&input).await?;
        info!(
            "Recorded collection #{} for {} in {}: {}",
            record.receipt_no, record.member_username, group.name, record.amount
        );
        self.audit
            .log_collection(actor(principal), &record)
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        let outcome = if notify {
            self.notify_collection(principal, &record, &group).await
        } else {
            None
        };
        Ok((record, outcome))
    }

    async fn notify_collection(
        &self,
        principal: &Principal,
        record: &CollectionRecord,
        group: &Group,
    ) -> Option<NotificationOutcome> {
        let member = match self.repos.users.find_by_username(&record.member_username).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                warn!("No account for {}, receipt not sent", record.member_username);
                return None;
            }
            Err(e) => {
                warn!("Member lookup failed, receipt not sent: {}", e);
                return None;
            }
        };

        let body = collection_receipt_message(
            &member.name,
            record.amount,
            &group.name,
            record.receipt_no,
            record.collected_on,
        );
        self.send_and_audit(principal, &member.phone, &body).await
    }

    async fn send_and_audit(&self, principal: &Principal, phone: &str, body: &str) -> Option<NotificationOutcome> {
        match self.notifier.send(phone, body).await {
            Ok(outcome) => {
                self.audit
                    .log_notification(actor(principal), &outcome)
                    .await
                    .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
                Some(outcome)
            }
            Err(e) => {
                warn!("Notification to {} failed: {}", phone, e);
                None
            }
        }
    }

    pub async fn list_collections(
        &self,
        principal: &Principal,
        filter: RecordFilter,
    ) -> AppResult<Vec<CollectionRecord>> {
        let member = Self::scoped_member(principal, filter.member_username)?;

        let mut records = match (filter.group_id, member, filter.employee_id) {
            (_, Some(username), _) => self.repos.collections.list_by_member(&username).await?,
            (Some(group_id), None, _) => self.repos.collections.list_by_group(group_id).await?,
            (None, None, Some(employee_id)) => self.repos.collections.list_by_collector(employee_id).await?,
            (None, None, None) => self.repos.collections.list_all().await?,
        };

        if let Some(group_id) = filter.group_id {
            records.retain(|r| r.group_id == group_id);
        }
        if let Some(employee_id) = filter.employee_id {
            records.retain(|r| r.collected_by == Some(employee_id));
        }
        Ok(records)
    }

    // =========================================================================
    // Payouts
    // =========================================================================

    pub async fn record_payment(&self, principal: &Principal, mut input: NewPayment) -> AppResult<PaymentRecord> {
        principal.require(&[Role::Admin])?;
        ensure_positive(input.amount, "Amount")?;
        input.member_username = validation::username(&input.member_username)?;
        input.note = input.note.as_deref().and_then(validation::optional);

        let group = self.require_group(input.group_id).await?;
        if !group.has_member(&input.member_username) {
            return Err(AppError::Validation(format!(
                "{} is not a member of {}",
                input.member_username, group.name
            )));
        }
        if let Some(payer) = input.paid_by {
            self.require_employee(payer).await?;
        }

        let record = self.repos.payments.create(&input).await?;
        info!("Recorded payout of {} to {} from {}", record.amount, record.member_username, group.name);
        self.audit
            .log_payment(actor(principal), &record)
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(record)
    }

    pub async fn list_payments(&self, principal: &Principal, filter: RecordFilter) -> AppResult<Vec<PaymentRecord>> {
        let member = Self::scoped_member(principal, filter.member_username)?;

        let mut records = match (filter.group_id, member) {
            (_, Some(username)) => self.repos.payments.list_by_member(&username).await?,
            (Some(group_id), None) => self.repos.payments.list_by_group(group_id).await?,
            (None, None) => self.repos.payments.list_all().await?,
        };

        if let Some(group_id) = filter.group_id {
            records.retain(|r| r.group_id == group_id);
        }
        Ok(records)
    }

    // =========================================================================
    // Salaries and expenses
    // =========================================================================

    pub async fn record_salary(&self, principal: &Principal, mut input: NewSalary) -> AppResult<SalaryRecord> {
        principal.require(&[Role::Admin])?;
        ensure_positive(input.amount, "Amount")?;
        input.salary_month = input.salary_month.trim().to_string();
        if !is_valid_salary_month(&input.salary_month) {
            return Err(AppError::Validation(format!(
                "Salary month must be YYYY-MM, got {:?}",
                input.salary_month
            )));
        }
        input.note = input.note.as_deref().and_then(validation::optional);
        self.require_employee(input.employee_id).await?;

        let record = self.repos.salaries.create(&input).await?;
        info!("Recorded salary {} for {} ({})", record.amount, record.employee_id, record.salary_month);
        self.audit
            .record(
                "salary_recorded",
                Some(actor(principal)),
                serde_json::json!({
                    "salary_id": record.id.to_string(),
                    "employee_id": record.employee_id.to_string(),
                    "amount": record.amount.to_string(),
                    "month": record.salary_month,
                }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(record)
    }

    pub async fn list_salaries(&self, principal: &Principal, filter: RecordFilter) -> AppResult<Vec<SalaryRecord>> {
        match Self::scoped_employee(principal, filter.employee_id)? {
            Some(employee_id) => Ok(self.repos.salaries.list_by_employee(employee_id).await?),
            None => Ok(self.repos.salaries.list_all().await?),
        }
    }

    pub async fn record_expense(&self, principal: &Principal, mut input: NewExpense) -> AppResult<ExpenseRecord> {
        principal.require(&[Role::Admin, Role::Employee])?;
        ensure_positive(input.amount, "Amount")?;
        input.category = validation::required(&input.category, "Category")?.to_lowercase();
        input.description = input.description.trim().to_string();

        if principal.role == Role::Employee {
            input.spent_by = Some(principal.subject_id);
        } else if let Some(spender) = input.spent_by {
            self.require_employee(spender).await?;
        }

        let record = self.repos.expenses.create(&input).await?;
        info!("Recorded expense {} ({})", record.amount, record.category);
        self.audit
            .record(
                "expense_recorded",
                Some(actor(principal)),
                serde_json::json!({
                    "expense_id": record.id.to_string(),
                    "category": record.category,
                    "amount": record.amount.to_string(),
                }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(record)
    }

    pub async fn list_expenses(
        &self,
        principal: &Principal,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<ExpenseRecord>> {
        principal.require(&[Role::Admin, Role::Employee])?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::Validation("Start date is after end date".to_string()));
            }
        }

        let mut records = self.repos.expenses.list(from, to).await?;
        if principal.role == Role::Employee {
            records.retain(|r| r.spent_by == Some(principal.subject_id));
        }
        Ok(records)
    }

    // =========================================================================
    // Employee cash credits
    // =========================================================================

    /// Admins record for any employee; employees only for themselves
    pub async fn record_credit(&self, principal: &Principal, mut input: NewCredit) -> AppResult<CreditRecord> {
        principal.require(&[Role::Admin, Role::Employee])?;
        ensure_positive(input.amount, "Amount")?;
        if principal.role == Role::Employee && input.employee_id != principal.subject_id {
            return Err(AppError::Forbidden("Employees may only record their own credits".to_string()));
        }
        input.note = input.note.as_deref().and_then(validation::optional);
        self.require_employee(input.employee_id).await?;

        let record = self.repos.credits.create(&input).await?;
        info!(
            "Recorded credit {} {} for employee {}",
            record.direction, record.amount, record.employee_id
        );
        self.audit
            .record(
                "credit_recorded",
                Some(actor(principal)),
                serde_json::json!({
                    "credit_id": record.id.to_string(),
                    "employee_id": record.employee_id.to_string(),
                    "direction": record.direction,
                    "amount": record.amount.to_string(),
                }),
            )
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(record)
    }

    pub async fn list_credits(&self, principal: &Principal, filter: RecordFilter) -> AppResult<Vec<CreditRecord>> {
        match Self::scoped_employee(principal, filter.employee_id)? {
            Some(employee_id) => Ok(self.repos.credits.list_by_employee(employee_id).await?),
            None => Ok(self.repos.credits.list_all().await?),
        }
    }

    // =========================================================================
    // Auctions
    // =========================================================================

    /// Record a monthly auction; payout and dividend are derived from the bid
    pub async fn record_auction(
        &self,
        principal: &Principal,
        group_id: Uuid,
        month_number: i32,
        winner_username: &str,
        bid_amount: Decimal,
        auction_date: NaiveDate,
        notify: bool,
    ) -> AppResult<(AuctionRecord, Vec<NotificationOutcome>)> {
        principal.require(&[Role::Admin])?;
        let winner = validation::username(winner_username)?;

        let group = self.require_group(group_id).await?;
        if group.status_enum() == GroupStatus::Closed {
            return Err(AppError::BusinessLogic(format!("Group {} is closed", group.name)));
        }
        if month_number < 1 || month_number > group.duration_months {
            return Err(AppError::Validation(format!(
                "Month must be between 1 and {}",
                group.duration_months
            )));
        }
        if !group.has_member(&winner) {
            return Err(AppError::Validation(format!("{} is not a member of {}", winner, group.name)));
        }
        if bid_amount < Decimal::ZERO || bid_amount >= group.total_amount {
            return Err(AppError::Validation(
                "Bid must be at least zero and below the group's total amount".to_string(),
            ));
        }

        let previous = self.repos.auctions.list_by_group(group_id).await?;
        if previous.iter().any(|a| a.month_number == month_number) {
            return Err(AppError::BusinessLogic(format!(
                "Auction for month {} has already been recorded",
                month_number
            )));
        }
        if previous.iter().any(|a| a.winner_username == winner) {
            return Err(AppError::BusinessLogic(format!(
                "{} has already won an auction in {}",
                winner, group.name
            )));
        }

        let (payout_amount, dividend_per_member) =
            auction_terms(group.total_amount, bid_amount, group.members.len());

        let record = self
            .repos
            .auctions
            .create(&NewAuction {
                group_id,
                month_number,
                winner_username: winner,
                bid_amount,
                payout_amount,
                dividend_per_member,
                auction_date,
            })
            .await?;

        info!(
            "Recorded auction month {} for {}: winner={} payout={}",
            record.month_number, group.name, record.winner_username, record.payout_amount
        );
        self.audit
            .log_auction(actor(principal), &record)
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));

        let outcomes = if notify {
            self.notify_auction_members(principal, &record, &group).await
        } else {
            Vec::new()
        };
        Ok((record, outcomes))
    }

    /// Re-send the announcement for an auction already recorded
    pub async fn notify_auction(
        &self,
        principal: &Principal,
        auction_id: Uuid,
    ) -> AppResult<Vec<NotificationOutcome>> {
        principal.require(&[Role::Admin])?;
        let record = self
            .repos
            .auctions
            .find_by_id(auction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Auction {} not found", auction_id)))?;
        let group = self.require_group(record.group_id).await?;

        Ok(self.notify_auction_members(principal, &record, &group).await)
    }

    async fn notify_auction_members(
        &self,
        principal: &Principal,
        record: &AuctionRecord,
        group: &Group,
    ) -> Vec<NotificationOutcome> {
        let body = auction_result_message(
            &group.name,
            record.month_number,
            &record.winner_username,
            record.payout_amount,
            record.dividend_per_member,
        );

        let mut outcomes = Vec::with_capacity(group.members.len());
        for username in &group.members {
            match self.repos.users.find_by_username(username).await {
                Ok(Some(member)) => {
                    if let Some(outcome) = self.send_and_audit(principal, &member.phone, &body).await {
                        outcomes.push(outcome);
                    }
                }
                Ok(None) => warn!("No account for {}, auction notice not sent", username),
                Err(e) => warn!("Member lookup for {} failed: {}", username, e),
            }
        }
        outcomes
    }

    pub async fn list_auctions(&self, principal: &Principal, filter: RecordFilter) -> AppResult<Vec<AuctionRecord>> {
        match filter.group_id {
            Some(group_id) => {
                let group = self.require_group(group_id).await?;
                ensure_can_view_group(principal, &group)?;
                Ok(self.repos.auctions.list_by_group(group_id).await?)
            }
            None => {
                principal.require(&[Role::Admin, Role::Employee])?;
                Ok(self.repos.auctions.list_all().await?)
            }
        }
    }

    /// Send an arbitrary message on both channels
    pub async fn send_notification(
        &self,
        principal: &Principal,
        phone: &str,
        body: &str,
    ) -> AppResult<NotificationOutcome> {
        principal.require(&[Role::Admin, Role::Employee])?;
        let outcome = self.notifier.send(phone, body).await?;
        self.audit
            .log_notification(actor(principal), &outcome)
            .await
            .unwrap_or_else(|e| warn!("Audit log failed: {}", e));
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, username: Option<&str>) -> Principal {
        Principal {
            subject_id: Uuid::new_v4(),
            role,
            name: "Test".to_string(),
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn test_member_scope_forced_to_self() {
        let member = principal(Role::Member, Some("anil"));
        assert_eq!(LedgerService::scoped_member(&member, None).unwrap(), Some("anil".to_string()));
        assert_eq!(
            LedgerService::scoped_member(&member, Some("anil".to_string())).unwrap(),
            Some("anil".to_string())
        );
        assert!(matches!(
            LedgerService::scoped_member(&member, Some("bina".to_string())),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_staff_scope_passes_through() {
        let admin = principal(Role::Admin, Some("office"));
        assert_eq!(LedgerService::scoped_member(&admin, None).unwrap(), None);

        let employee = principal(Role::Employee, None);
        assert_eq!(
            LedgerService::scoped_member(&employee, Some("bina".to_string())).unwrap(),
            Some("bina".to_string())
        );
    }

    #[test]
    fn test_employee_scope() {
        let employee = principal(Role::Employee, None);
        assert_eq!(
            LedgerService::scoped_employee(&employee, None).unwrap(),
            Some(employee.subject_id)
        );
        assert!(LedgerService::scoped_employee(&employee, Some(Uuid::new_v4())).is_err());

        let admin = principal(Role::Admin, None);
        assert_eq!(LedgerService::scoped_employee(&admin, None).unwrap(), None);

        let member = principal(Role::Member, Some("anil"));
        assert!(LedgerService::scoped_employee(&member, None).is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(Decimal::ONE, "Amount").is_ok());
        assert!(ensure_positive(Decimal::ZERO, "Amount").is_err());
        assert!(ensure_positive(Decimal::new(1_000_000_000_000, 0), "Amount").is_err());
    }
}
