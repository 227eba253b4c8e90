//! gRPC service implementation for ChitConnect
//!
//! Handlers authenticate the caller from the `authorization` metadata,
//! convert wire strings into domain types and delegate to the services.

use crate::auth::{self, Principal};
use crate::error::AppError;
use crate::format::{self, format_inr, iso_date, today};
use crate::models::*;
use crate::proto::chit_service_server::{ChitService, ChitServiceServer};
use crate::proto::*;
use crate::reports::{EmployeeBalance, GroupSummary, HistoryEntry, MemberHistory};
use crate::services::{NotificationOutcome, RecordFilter};
use crate::AppState;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{error, info};
use uuid::Uuid;

/// gRPC service implementation
pub struct ChitGrpcService {
    app_state: Arc<AppState>,
}

impl ChitGrpcService {
    /// Create a new gRPC service
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self { app_state }
    }

    /// Create a tonic server for this service
    pub fn into_server(self) -> ChitServiceServer<Self> {
        ChitServiceServer::new(self)
    }

    /// Convert AppError to tonic Status
    pub fn to_status(err: AppError) -> Status {
        match err {
            AppError::NotFound(msg) => Status::not_found(msg),
            AppError::Unauthorized(msg) => Status::unauthenticated(msg),
            AppError::Forbidden(msg) => Status::permission_denied(msg),
            AppError::Validation(msg) => Status::invalid_argument(msg),
            AppError::InvalidUuid(e) => Status::invalid_argument(e.to_string()),
            AppError::InvalidDecimal(e) => Status::invalid_argument(e.to_string()),
            AppError::BusinessLogic(msg) => Status::failed_precondition(msg),
            AppError::ExternalService(msg) => {
                error!("External service error: {}", msg);
                Status::unavailable(msg)
            }
            AppError::Database(_) | AppError::Sqlx(_) => {
                error!("Database error: {:?}", err);
                Status::internal("Database error")
            }
            _ => {
                error!("Internal error: {:?}", err);
                Status::internal("Internal server error")
            }
        }
    }

    /// Helper to parse UUID from string
    fn parse_uuid(s: &str, field_name: &str) -> Result<Uuid, Status> {
        Uuid::parse_str(s.trim())
            .map_err(|_| Status::invalid_argument(format!("Invalid {}: {}", field_name, s)))
    }

    /// Blank means unset
    fn parse_optional_uuid(s: &str, field_name: &str) -> Result<Option<Uuid>, Status> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            Self::parse_uuid(s, field_name).map(Some)
        }
    }

    fn parse_amount(raw: &str, field_name: &str) -> Result<Decimal, Status> {
        format::parse_amount(raw, field_name).map_err(Self::to_status)
    }

    /// Blank dates default to today
    fn parse_date(raw: &str) -> Result<NaiveDate, Status> {
        format::parse_date_or(raw, today()).map_err(Self::to_status)
    }

    fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, Status> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            format::parse_date(raw).map(Some).map_err(Self::to_status)
        }
    }

    /// Blank means cash
    fn parse_payment_mode(raw: &str) -> Result<PaymentMode, Status> {
        if raw.trim().is_empty() {
            return Ok(PaymentMode::Cash);
        }
        PaymentMode::from_str(raw).map_err(Status::invalid_argument)
    }

    fn bearer_token<T>(request: &Request<T>) -> Result<String, Status> {
        let header = request
            .metadata()
            .get("authorization")
            .ok_or_else(|| Status::unauthenticated("Missing authorization metadata"))?
            .to_str()
            .map_err(|_| Status::unauthenticated("Malformed authorization metadata"))?;
        auth::parse_bearer(header)
            .map(str::to_string)
            .map_err(Self::to_status)
    }

    /// Resolve the caller from the request's bearer token
    async fn principal<T>(&self, request: &Request<T>) -> Result<Principal, Status> {
        let token = Self::bearer_token(request)?;
        self.app_state
            .auth_service
            .authenticate(&token)
            .await
            .map_err(Self::to_status)
    }
}

// ============================================================================
// Domain -> wire conversions
// ============================================================================

fn timestamp(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp()
}

fn opt_id(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn principal_response(principal: &Principal) -> PrincipalResponse {
    PrincipalResponse {
        subject_id: principal.subject_id.to_string(),
        role: principal.role.as_str().to_string(),
        name: principal.name.clone(),
        username: principal.username.clone().unwrap_or_default(),
    }
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        role: user.role_enum().as_str().to_string(),
        name: user.name,
        username: user.username,
        phone: user.phone,
        address: user.address.unwrap_or_default(),
        created_at: timestamp(user.created_at),
    }
}

fn employee_response(employee: Employee) -> EmployeeResponse {
    EmployeeResponse {
        id: employee.id.to_string(),
        name: employee.name,
        phone: employee.phone,
        designation: employee.designation,
        monthly_salary: employee.monthly_salary.to_string(),
        monthly_salary_display: format_inr(employee.monthly_salary),
        active: employee.active,
        created_at: timestamp(employee.created_at),
    }
}

fn group_response(group: Group) -> GroupResponse {
    GroupResponse {
        id: group.id.to_string(),
        total_amount: group.total_amount.to_string(),
        total_amount_display: format_inr(group.total_amount),
        monthly_installment: group.monthly_installment.to_string(),
        monthly_installment_display: format_inr(group.monthly_installment),
        duration_months: group.duration_months,
        start_date: iso_date(group.start_date),
        end_date: iso_date(group.end_date()),
        is_closed: group.is_closed_on(today()),
        status: group.status_enum().as_str().to_string(),
        created_at: timestamp(group.created_at),
        name: group.name,
        members: group.members,
    }
}

fn delivery_result(outcome: NotificationOutcome) -> DeliveryResult {
    DeliveryResult {
        to: outcome.to,
        sms_sid: outcome.sms.message_sid.unwrap_or_default(),
        sms_error: outcome.sms.error.unwrap_or_default(),
        whatsapp_sid: outcome.whatsapp.message_sid.unwrap_or_default(),
        whatsapp_error: outcome.whatsapp.error.unwrap_or_default(),
    }
}

fn collection_response(record: CollectionRecord, notification: Option<NotificationOutcome>) -> CollectionResponse {
    CollectionResponse {
        id: record.id.to_string(),
        receipt_no: record.receipt_no,
        group_id: record.group_id.to_string(),
        member_username: record.member_username,
        amount: record.amount.to_string(),
        amount_display: format_inr(record.amount),
        payment_mode: record.payment_mode,
        collected_by: opt_id(record.collected_by),
        collected_on: iso_date(record.collected_on),
        collected_on_display: format::format_date(record.collected_on),
        note: record.note.unwrap_or_default(),
        notification: notification.map(delivery_result),
    }
}

fn payment_response(record: PaymentRecord) -> PaymentResponse {
    PaymentResponse {
        id: record.id.to_string(),
        group_id: record.group_id.to_string(),
        member_username: record.member_username,
        amount: record.amount.to_string(),
        amount_display: format_inr(record.amount),
        payment_mode: record.payment_mode,
        paid_by: opt_id(record.paid_by),
        paid_on: iso_date(record.paid_on),
        note: record.note.unwrap_or_default(),
    }
}

fn salary_response(record: SalaryRecord) -> SalaryResponse {
    SalaryResponse {
        id: record.id.to_string(),
        employee_id: record.employee_id.to_string(),
        amount: record.amount.to_string(),
        amount_display: format_inr(record.amount),
        salary_month: record.salary_month,
        paid_on: iso_date(record.paid_on),
        note: record.note.unwrap_or_default(),
    }
}

fn expense_response(record: ExpenseRecord) -> ExpenseResponse {
    ExpenseResponse {
        id: record.id.to_string(),
        category: record.category,
        amount: record.amount.to_string(),
        amount_display: format_inr(record.amount),
        description: record.description,
        spent_by: opt_id(record.spent_by),
        spent_on: iso_date(record.spent_on),
    }
}

fn credit_response(record: CreditRecord) -> CreditResponse {
    CreditResponse {
        id: record.id.to_string(),
        employee_id: record.employee_id.to_string(),
        amount: record.amount.to_string(),
        amount_display: format_inr(record.amount),
        direction: record.direction,
        note: record.note.unwrap_or_default(),
        credited_on: iso_date(record.credited_on),
    }
}

fn auction_response(record: AuctionRecord, notifications: Vec<NotificationOutcome>) -> AuctionResponse {
    AuctionResponse {
        id: record.id.to_string(),
        group_id: record.group_id.to_string(),
        month_number: record.month_number,
        winner_username: record.winner_username,
        bid_amount: record.bid_amount.to_string(),
        bid_amount_display: format_inr(record.bid_amount),
        payout_amount: record.payout_amount.to_string(),
        payout_amount_display: format_inr(record.payout_amount),
        dividend_per_member: record.dividend_per_member.to_string(),
        dividend_per_member_display: format_inr(record.dividend_per_member),
        auction_date: iso_date(record.auction_date),
        notifications: notifications.into_iter().map(delivery_result).collect(),
    }
}

fn group_summary_response(summary: GroupSummary) -> GroupSummaryResponse {
    GroupSummaryResponse {
        installments_due: summary.installments_due,
        total_collected: summary.total_collected.to_string(),
        total_collected_display: format_inr(summary.total_collected),
        expected_to_date: summary.expected_to_date.to_string(),
        expected_to_date_display: format_inr(summary.expected_to_date),
        outstanding: summary.outstanding.to_string(),
        outstanding_display: format_inr(summary.outstanding),
        term_target: summary.term_target.to_string(),
        term_target_display: format_inr(summary.term_target),
        progress_percent: summary.progress_percent.to_string(),
        member_totals: summary
            .member_totals
            .into_iter()
            .map(|m| MemberTotalEntry {
                collected: m.collected.to_string(),
                collected_display: format_inr(m.collected),
                installments_paid: m.installments_paid as u32,
                username: m.username,
            })
            .collect(),
        auctions: summary
            .auctions
            .into_iter()
            .map(|a| auction_response(a, Vec::new()))
            .collect(),
        group: Some(group_response(summary.group)),
    }
}

fn history_entry_response(entry: HistoryEntry) -> HistoryEntryResponse {
    HistoryEntryResponse {
        kind: entry.kind.as_str().to_string(),
        record_id: entry.record_id.to_string(),
        group_id: entry.group_id.to_string(),
        amount: entry.amount.to_string(),
        amount_display: format_inr(entry.amount),
        date: iso_date(entry.date),
        date_display: format::format_date(entry.date),
        payment_mode: entry.payment_mode,
        receipt_no: entry.receipt_no.unwrap_or(0),
        note: entry.note.unwrap_or_default(),
    }
}

fn member_history_response(history: MemberHistory) -> MemberHistoryResponse {
    MemberHistoryResponse {
        total_paid: history.total_paid.to_string(),
        total_paid_display: format_inr(history.total_paid),
        total_received: history.total_received.to_string(),
        total_received_display: format_inr(history.total_received),
        entries: history.entries.into_iter().map(history_entry_response).collect(),
    }
}

fn employee_balance_response(balance: EmployeeBalance) -> EmployeeBalanceResponse {
    EmployeeBalanceResponse {
        employee_id: balance.employee_id.to_string(),
        received: balance.received.to_string(),
        received_display: format_inr(balance.received),
        sent: balance.sent.to_string(),
        sent_display: format_inr(balance.sent),
        balance: balance.balance.to_string(),
        balance_display: format_inr(balance.balance),
        collections_count: balance.collections_count as u32,
        collections_total: balance.collections_total.to_string(),
        collections_total_display: format_inr(balance.collections_total),
    }
}

fn notification_response(outcomes: Vec<NotificationOutcome>, simulated: bool) -> NotificationResponse {
    let delivered_count = outcomes.iter().filter(|o| o.any_delivered()).count() as u32;
    NotificationResponse {
        results: outcomes.into_iter().map(delivery_result).collect(),
        delivered_count,
        simulated,
    }
}

fn total_of<T>(records: &[T], amount: impl Fn(&T) -> Decimal) -> (String, String) {
    let total: Decimal = records.iter().map(amount).sum();
    (total.to_string(), format_inr(total))
}

fn list_filter(req: &ListRecordsRequest) -> Result<RecordFilter, Status> {
    Ok(RecordFilter {
        group_id: ChitGrpcService::parse_optional_uuid(&req.group_id, "group_id")?,
        member_username: crate::validation::optional(&req.member_username),
        employee_id: ChitGrpcService::parse_optional_uuid(&req.employee_id, "employee_id")?,
    })
}

fn ack(message: &str) -> Response<Ack> {
    Response::new(Ack {
        ok: true,
        message: message.to_string(),
    })
}

#[tonic::async_trait]
impl ChitService for ChitGrpcService {
    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        info!("Login request");

        let result = self
            .app_state
            .auth_service
            .login(&req.phone, &req.password)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(LoginResponse {
            token: result.token,
            expires_at: timestamp(result.expires_at),
            principal: Some(principal_response(&result.principal)),
        }))
    }

    async fn logout(&self, request: Request<Empty>) -> Result<Response<Ack>, Status> {
        let token = Self::bearer_token(&request)?;
        let ended = self
            .app_state
            .auth_service
            .logout(&token)
            .await
            .map_err(Self::to_status)?;

        Ok(ack(if ended { "Logged out" } else { "No active session" }))
    }

    async fn who_am_i(&self, request: Request<Empty>) -> Result<Response<PrincipalResponse>, Status> {
        let principal = self.principal(&request).await?;
        Ok(Response::new(principal_response(&principal)))
    }

    async fn change_password(&self, request: Request<ChangePasswordRequest>) -> Result<Response<Ack>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        self.app_state
            .auth_service
            .change_password(&principal, &req.current_password, &req.new_password)
            .await
            .map_err(Self::to_status)?;

        Ok(ack("Password changed, please log in again"))
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    async fn create_user(&self, request: Request<CreateUserRequest>) -> Result<Response<UserResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("CreateUser request: username={}", req.username);

        let role = if req.role.trim().is_empty() {
            Role::Member
        } else {
            Role::from_str(&req.role).map_err(Status::invalid_argument)?
        };

        let user = self
            .app_state
            .directory_service
            .create_user(
                &principal,
                NewUser {
                    name: req.name,
                    username: req.username,
                    phone: req.phone,
                    password: req.password,
                    role,
                    address: Some(req.address),
                },
            )
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(user_response(user)))
    }

    async fn list_users(&self, request: Request<ListUsersRequest>) -> Result<Response<UserListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let role = if req.role.trim().is_empty() {
            None
        } else {
            Some(Role::from_str(&req.role).map_err(Status::invalid_argument)?)
        };

        let users = self
            .app_state
            .directory_service
            .list_users(&principal, role)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(UserListResponse {
            users: users.into_iter().map(user_response).collect(),
        }))
    }

    async fn get_user(&self, request: Request<IdRequest>) -> Result<Response<UserResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let user = self
            .app_state
            .directory_service
            .get_user(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(user_response(user)))
    }

    async fn update_user(&self, request: Request<UpdateUserRequest>) -> Result<Response<UserResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        let id = Self::parse_uuid(&req.id, "id")?;

        let user = self
            .app_state
            .directory_service
            .update_user(&principal, id, &req.name, &req.phone, &req.address)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(user_response(user)))
    }

    async fn delete_user(&self, request: Request<IdRequest>) -> Result<Response<Ack>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        self.app_state
            .directory_service
            .delete_user(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(ack("User deleted"))
    }

    // ------------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------------

    async fn create_employee(
        &self,
        request: Request<CreateEmployeeRequest>,
    ) -> Result<Response<EmployeeResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("CreateEmployee request: name={}", req.name);

        let monthly_salary = if req.monthly_salary.trim().is_empty() {
            Decimal::ZERO
        } else {
            Self::parse_amount(&req.monthly_salary, "Monthly salary")?
        };

        let employee = self
            .app_state
            .directory_service
            .create_employee(
                &principal,
                NewEmployee {
                    name: req.name,
                    phone: req.phone,
                    password: req.password,
                    designation: req.designation,
                    monthly_salary,
                },
            )
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(employee_response(employee)))
    }

    async fn list_employees(&self, request: Request<Empty>) -> Result<Response<EmployeeListResponse>, Status> {
        let principal = self.principal(&request).await?;

        let employees = self
            .app_state
            .directory_service
            .list_employees(&principal)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(EmployeeListResponse {
            employees: employees.into_iter().map(employee_response).collect(),
        }))
    }

    async fn get_employee(&self, request: Request<IdRequest>) -> Result<Response<EmployeeResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let employee = self
            .app_state
            .directory_service
            .get_employee(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(employee_response(employee)))
    }

    async fn deactivate_employee(&self, request: Request<IdRequest>) -> Result<Response<EmployeeResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let employee = self
            .app_state
            .directory_service
            .deactivate_employee(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(employee_response(employee)))
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    async fn create_group(&self, request: Request<CreateGroupRequest>) -> Result<Response<GroupResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("CreateGroup request: name={}", req.name);

        let input = NewGroup {
            total_amount: Self::parse_amount(&req.total_amount, "Total amount")?,
            monthly_installment: Self::parse_amount(&req.monthly_installment, "Monthly installment")?,
            duration_months: req.duration_months,
            start_date: Self::parse_date(&req.start_date)?,
            members: req.members,
            name: req.name,
        };

        let group = self
            .app_state
            .group_service
            .create_group(&principal, input)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_response(group)))
    }

    async fn list_groups(&self, request: Request<Empty>) -> Result<Response<GroupListResponse>, Status> {
        let principal = self.principal(&request).await?;

        let groups = self
            .app_state
            .group_service
            .list_groups(&principal)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(GroupListResponse {
            groups: groups.into_iter().map(group_response).collect(),
        }))
    }

    async fn get_group(&self, request: Request<IdRequest>) -> Result<Response<GroupResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let group = self
            .app_state
            .group_service
            .get_group(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_response(group)))
    }

    async fn add_group_member(&self, request: Request<GroupMemberRequest>) -> Result<Response<GroupResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        let group_id = Self::parse_uuid(&req.group_id, "group_id")?;

        let group = self
            .app_state
            .group_service
            .add_member(&principal, group_id, &req.username)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_response(group)))
    }

    async fn remove_group_member(
        &self,
        request: Request<GroupMemberRequest>,
    ) -> Result<Response<GroupResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        let group_id = Self::parse_uuid(&req.group_id, "group_id")?;

        let group = self
            .app_state
            .group_service
            .remove_member(&principal, group_id, &req.username)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_response(group)))
    }

    async fn close_group(&self, request: Request<IdRequest>) -> Result<Response<GroupResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let group = self
            .app_state
            .group_service
            .close_group(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_response(group)))
    }

    // ------------------------------------------------------------------------
    // Collections and payouts
    // ------------------------------------------------------------------------

    async fn record_collection(
        &self,
        request: Request<RecordCollectionRequest>,
    ) -> Result<Response<CollectionResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("RecordCollection request: group={}, member={}", req.group_id, req.member_username);

        let input = NewCollection {
            group_id: Self::parse_uuid(&req.group_id, "group_id")?,
            amount: Self::parse_amount(&req.amount, "Amount")?,
            payment_mode: Self::parse_payment_mode(&req.payment_mode)?,
            collected_by: Self::parse_optional_uuid(&req.collected_by, "collected_by")?,
            collected_on: Self::parse_date(&req.collected_on)?,
            note: Some(req.note),
            member_username: req.member_username,
        };

        let (record, outcome) = self
            .app_state
            .ledger_service
            .record_collection(&principal, input, req.notify)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(collection_response(record, outcome)))
    }

    async fn list_collections(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<CollectionListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let filter = list_filter(request.get_ref())?;

        let records = self
            .app_state
            .ledger_service
            .list_collections(&principal, filter)
            .await
            .map_err(Self::to_status)?;

        let (total, total_display) = total_of(&records, |r| r.amount);
        Ok(Response::new(CollectionListResponse {
            collections: records.into_iter().map(|r| collection_response(r, None)).collect(),
            total,
            total_display,
        }))
    }

    async fn record_payment(
        &self,
        request: Request<RecordPaymentRequest>,
    ) -> Result<Response<PaymentResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("RecordPayment request: group={}, member={}", req.group_id, req.member_username);

        let input = NewPayment {
            group_id: Self::parse_uuid(&req.group_id, "group_id")?,
            amount: Self::parse_amount(&req.amount, "Amount")?,
            payment_mode: Self::parse_payment_mode(&req.payment_mode)?,
            paid_by: Self::parse_optional_uuid(&req.paid_by, "paid_by")?,
            paid_on: Self::parse_date(&req.paid_on)?,
            note: Some(req.note),
            member_username: req.member_username,
        };

        let record = self
            .app_state
            .ledger_service
            .record_payment(&principal, input)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(payment_response(record)))
    }

    async fn list_payments(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<PaymentListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let filter = list_filter(request.get_ref())?;

        let records = self
            .app_state
            .ledger_service
            .list_payments(&principal, filter)
            .await
            .map_err(Self::to_status)?;

        let (total, total_display) = total_of(&records, |r| r.amount);
        Ok(Response::new(PaymentListResponse {
            payments: records.into_iter().map(payment_response).collect(),
            total,
            total_display,
        }))
    }

    // ------------------------------------------------------------------------
    // Salaries, expenses and credits
    // ------------------------------------------------------------------------

    async fn record_salary(&self, request: Request<RecordSalaryRequest>) -> Result<Response<SalaryResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let input = NewSalary {
            employee_id: Self::parse_uuid(&req.employee_id, "employee_id")?,
            amount: Self::parse_amount(&req.amount, "Amount")?,
            salary_month: req.salary_month,
            paid_on: Self::parse_date(&req.paid_on)?,
            note: Some(req.note),
        };

        let record = self
            .app_state
            .ledger_service
            .record_salary(&principal, input)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(salary_response(record)))
    }

    async fn list_salaries(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<SalaryListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let filter = list_filter(request.get_ref())?;

        let records = self
            .app_state
            .ledger_service
            .list_salaries(&principal, filter)
            .await
            .map_err(Self::to_status)?;

        let (total, total_display) = total_of(&records, |r| r.amount);
        Ok(Response::new(SalaryListResponse {
            salaries: records.into_iter().map(salary_response).collect(),
            total,
            total_display,
        }))
    }

    async fn record_expense(
        &self,
        request: Request<RecordExpenseRequest>,
    ) -> Result<Response<ExpenseResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let input = NewExpense {
            amount: Self::parse_amount(&req.amount, "Amount")?,
            spent_by: Self::parse_optional_uuid(&req.spent_by, "spent_by")?,
            spent_on: Self::parse_date(&req.spent_on)?,
            category: req.category,
            description: req.description,
        };

        let record = self
            .app_state
            .ledger_service
            .record_expense(&principal, input)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(expense_response(record)))
    }

    async fn list_expenses(
        &self,
        request: Request<ListExpensesRequest>,
    ) -> Result<Response<ExpenseListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let records = self
            .app_state
            .ledger_service
            .list_expenses(
                &principal,
                Self::parse_optional_date(&req.from)?,
                Self::parse_optional_date(&req.to)?,
            )
            .await
            .map_err(Self::to_status)?;

        let (total, total_display) = total_of(&records, |r| r.amount);
        Ok(Response::new(ExpenseListResponse {
            expenses: records.into_iter().map(expense_response).collect(),
            total,
            total_display,
        }))
    }

    async fn record_credit(&self, request: Request<RecordCreditRequest>) -> Result<Response<CreditResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let input = NewCredit {
            employee_id: Self::parse_uuid(&req.employee_id, "employee_id")?,
            amount: Self::parse_amount(&req.amount, "Amount")?,
            direction: CreditDirection::from_str(&req.direction).map_err(Status::invalid_argument)?,
            credited_on: Self::parse_date(&req.credited_on)?,
            note: Some(req.note),
        };

        let record = self
            .app_state
            .ledger_service
            .record_credit(&principal, input)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(credit_response(record)))
    }

    async fn list_credits(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<CreditListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let filter = list_filter(request.get_ref())?;

        let records = self
            .app_state
            .ledger_service
            .list_credits(&principal, filter)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(CreditListResponse {
            credits: records.into_iter().map(credit_response).collect(),
        }))
    }

    // ------------------------------------------------------------------------
    // Auctions
    // ------------------------------------------------------------------------

    async fn record_auction(
        &self,
        request: Request<RecordAuctionRequest>,
    ) -> Result<Response<AuctionResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();
        info!("RecordAuction request: group={}, month={}", req.group_id, req.month_number);

        let group_id = Self::parse_uuid(&req.group_id, "group_id")?;
        // A zero bid is allowed, so blank means zero rather than an error
        let bid_amount = if req.bid_amount.trim().is_empty() {
            Decimal::ZERO
        } else {
            format::parse_amount_allow_zero(&req.bid_amount, "Bid amount").map_err(Self::to_status)?
        };

        let (record, outcomes) = self
            .app_state
            .ledger_service
            .record_auction(
                &principal,
                group_id,
                req.month_number,
                &req.winner_username,
                bid_amount,
                Self::parse_date(&req.auction_date)?,
                req.notify,
            )
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(auction_response(record, outcomes)))
    }

    async fn list_auctions(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<AuctionListResponse>, Status> {
        let principal = self.principal(&request).await?;
        let filter = list_filter(request.get_ref())?;

        let records = self
            .app_state
            .ledger_service
            .list_auctions(&principal, filter)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(AuctionListResponse {
            auctions: records.into_iter().map(|r| auction_response(r, Vec::new())).collect(),
        }))
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    async fn get_admin_overview(&self, request: Request<Empty>) -> Result<Response<AdminOverviewResponse>, Status> {
        let principal = self.principal(&request).await?;

        let overview = self
            .app_state
            .report_service
            .admin_overview(&principal)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(AdminOverviewResponse {
            total_groups: overview.total_groups as u32,
            active_groups: overview.active_groups as u32,
            closed_groups: overview.closed_groups as u32,
            member_count: overview.member_count,
            employee_count: overview.employee_count,
            total_collected: overview.total_collected.to_string(),
            total_collected_display: format_inr(overview.total_collected),
            total_paid_out: overview.total_paid_out.to_string(),
            total_paid_out_display: format_inr(overview.total_paid_out),
            total_expenses: overview.total_expenses.to_string(),
            total_expenses_display: format_inr(overview.total_expenses),
            total_salaries: overview.total_salaries.to_string(),
            total_salaries_display: format_inr(overview.total_salaries),
            net_cash: overview.net_cash.to_string(),
            net_cash_display: format_inr(overview.net_cash),
        }))
    }

    async fn get_group_summary(&self, request: Request<IdRequest>) -> Result<Response<GroupSummaryResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let summary = self
            .app_state
            .report_service
            .group_summary(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(group_summary_response(summary)))
    }

    async fn get_member_history(
        &self,
        request: Request<MemberHistoryRequest>,
    ) -> Result<Response<MemberHistoryResponse>, Status> {
        let principal = self.principal(&request).await?;
        let username = crate::validation::optional(&request.get_ref().username);

        let history = self
            .app_state
            .report_service
            .member_history(&principal, username.as_deref())
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(member_history_response(history)))
    }

    async fn get_employee_balance(
        &self,
        request: Request<IdRequest>,
    ) -> Result<Response<EmployeeBalanceResponse>, Status> {
        let principal = self.principal(&request).await?;
        // Employees may leave the id blank to ask about themselves
        let id = match Self::parse_optional_uuid(&request.get_ref().id, "id")? {
            Some(id) => id,
            None => principal.subject_id,
        };

        let balance = self
            .app_state
            .report_service
            .employee_balance(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(employee_balance_response(balance)))
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    async fn send_notification(
        &self,
        request: Request<SendNotificationRequest>,
    ) -> Result<Response<NotificationResponse>, Status> {
        let principal = self.principal(&request).await?;
        let req = request.into_inner();

        let phone = format::normalize_phone(&req.phone).map_err(Self::to_status)?;
        let message = crate::validation::required(&req.message, "Message").map_err(Self::to_status)?;

        let outcome = self
            .app_state
            .ledger_service
            .send_notification(&principal, &phone, &message)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(notification_response(
            vec![outcome],
            self.app_state.notification_service.is_simulated(),
        )))
    }

    async fn send_auction_notification(
        &self,
        request: Request<IdRequest>,
    ) -> Result<Response<NotificationResponse>, Status> {
        let principal = self.principal(&request).await?;
        let id = Self::parse_uuid(&request.get_ref().id, "id")?;

        let outcomes = self
            .app_state
            .ledger_service
            .notify_auction(&principal, id)
            .await
            .map_err(Self::to_status)?;

        Ok(Response::new(notification_response(
            outcomes,
            self.app_state.notification_service.is_simulated(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification::{Channel, ChannelOutcome};

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ChitGrpcService::to_status(AppError::Forbidden("no".into())).code(),
            tonic::Code::PermissionDenied
        );
        assert_eq!(
            ChitGrpcService::to_status(AppError::Unauthorized("no".into())).code(),
            tonic::Code::Unauthenticated
        );
        assert_eq!(
            ChitGrpcService::to_status(AppError::BusinessLogic("closed".into())).code(),
            tonic::Code::FailedPrecondition
        );
        assert_eq!(
            ChitGrpcService::to_status(AppError::ExternalService("twilio".into())).code(),
            tonic::Code::Unavailable
        );
    }

    #[test]
    fn test_bearer_token_from_metadata() {
        let mut request = Request::new(Empty {});
        assert_eq!(
            ChitGrpcService::bearer_token(&request).unwrap_err().code(),
            tonic::Code::Unauthenticated
        );

        request
            .metadata_mut()
            .insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(ChitGrpcService::bearer_token(&request).unwrap(), "abc123");
    }

    #[test]
    fn test_optional_fields() {
        assert_eq!(ChitGrpcService::parse_optional_uuid("  ", "id").unwrap(), None);
        assert!(ChitGrpcService::parse_optional_uuid("nope", "id").is_err());
        assert_eq!(ChitGrpcService::parse_payment_mode("").unwrap(), PaymentMode::Cash);
        assert_eq!(ChitGrpcService::parse_payment_mode("NEFT").unwrap(), PaymentMode::Bank);
        assert!(ChitGrpcService::parse_optional_date("").unwrap().is_none());
    }

    #[test]
    fn test_notification_response_counts_deliveries() {
        let delivered = NotificationOutcome {
            to: "+919876543210".to_string(),
            sms: ChannelOutcome {
                channel: Channel::Sms,
                message_sid: Some("SM1".to_string()),
                error: None,
            },
            whatsapp: ChannelOutcome {
                channel: Channel::WhatsApp,
                message_sid: None,
                error: Some("not opted in".to_string()),
            },
        };
        let failed = NotificationOutcome {
            sms: ChannelOutcome {
                channel: Channel::Sms,
                message_sid: None,
                error: Some("rejected".to_string()),
            },
            ..delivered.clone()
        };
        let response = notification_response(vec![delivered, failed], true);
        assert_eq!(response.delivered_count, 1);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].whatsapp_error, "not opted in");
        assert!(response.simulated);
    }
}
