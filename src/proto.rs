//! Wire messages for the `chitconnect.ChitService` gRPC API.
//!
//! Money travels as decimal strings (`"2500.00"`) with a `*_display` twin
//! formatted for people (`"₹2,500.00"`). Dates are `YYYY-MM-DD` strings and
//! timestamps are unix seconds. Empty strings mean "not set".

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ack {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IdRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub phone: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrincipalResponse {
    #[prost(string, tag = "1")]
    pub subject_id: String,
    /// "admin", "employee" or "member"
    #[prost(string, tag = "2")]
    pub role: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(int64, tag = "2")]
    pub expires_at: i64,
    #[prost(message, optional, tag = "3")]
    pub principal: Option<PrincipalResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChangePasswordRequest {
    #[prost(string, tag = "1")]
    pub current_password: String,
    #[prost(string, tag = "2")]
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Users and employees
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateUserRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub username: String,
    #[prost(string, tag = "3")]
    pub phone: String,
    #[prost(string, tag = "4")]
    pub password: String,
    /// "admin" or "member"; blank means member
    #[prost(string, tag = "5")]
    pub role: String,
    #[prost(string, tag = "6")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListUsersRequest {
    #[prost(string, tag = "1")]
    pub role: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateUserRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub phone: String,
    #[prost(string, tag = "4")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub phone: String,
    #[prost(string, tag = "5")]
    pub role: String,
    #[prost(string, tag = "6")]
    pub address: String,
    #[prost(int64, tag = "7")]
    pub created_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserListResponse {
    #[prost(message, repeated, tag = "1")]
    pub users: Vec<UserResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateEmployeeRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub phone: String,
    #[prost(string, tag = "3")]
    pub password: String,
    #[prost(string, tag = "4")]
    pub designation: String,
    #[prost(string, tag = "5")]
    pub monthly_salary: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmployeeResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub phone: String,
    #[prost(string, tag = "4")]
    pub designation: String,
    #[prost(string, tag = "5")]
    pub monthly_salary: String,
    #[prost(string, tag = "6")]
    pub monthly_salary_display: String,
    #[prost(bool, tag = "7")]
    pub active: bool,
    #[prost(int64, tag = "8")]
    pub created_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmployeeListResponse {
    #[prost(message, repeated, tag = "1")]
    pub employees: Vec<EmployeeResponse>,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateGroupRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub total_amount: String,
    #[prost(string, tag = "3")]
    pub monthly_installment: String,
    #[prost(int32, tag = "4")]
    pub duration_months: i32,
    /// Blank means today
    #[prost(string, tag = "5")]
    pub start_date: String,
    #[prost(string, repeated, tag = "6")]
    pub members: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupMemberRequest {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub total_amount: String,
    #[prost(string, tag = "4")]
    pub total_amount_display: String,
    #[prost(string, tag = "5")]
    pub monthly_installment: String,
    #[prost(string, tag = "6")]
    pub monthly_installment_display: String,
    #[prost(int32, tag = "7")]
    pub duration_months: i32,
    #[prost(string, tag = "8")]
    pub start_date: String,
    #[prost(string, tag = "9")]
    pub end_date: String,
    #[prost(string, repeated, tag = "10")]
    pub members: Vec<String>,
    #[prost(string, tag = "11")]
    pub status: String,
    #[prost(bool, tag = "12")]
    pub is_closed: bool,
    #[prost(int64, tag = "13")]
    pub created_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupListResponse {
    #[prost(message, repeated, tag = "1")]
    pub groups: Vec<GroupResponse>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRecordsRequest {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub member_username: String,
    #[prost(string, tag = "3")]
    pub employee_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordCollectionRequest {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub member_username: String,
    #[prost(string, tag = "3")]
    pub amount: String,
    #[prost(string, tag = "4")]
    pub payment_mode: String,
    #[prost(string, tag = "5")]
    pub collected_by: String,
    #[prost(string, tag = "6")]
    pub collected_on: String,
    #[prost(string, tag = "7")]
    pub note: String,
    /// Send the member a receipt by SMS and WhatsApp
    #[prost(bool, tag = "8")]
    pub notify: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeliveryResult {
    #[prost(string, tag = "1")]
    pub to: String,
    #[prost(string, tag = "2")]
    pub sms_sid: String,
    #[prost(string, tag = "3")]
    pub sms_error: String,
    #[prost(string, tag = "4")]
    pub whatsapp_sid: String,
    #[prost(string, tag = "5")]
    pub whatsapp_error: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(int64, tag = "2")]
    pub receipt_no: i64,
    #[prost(string, tag = "3")]
    pub group_id: String,
    #[prost(string, tag = "4")]
    pub member_username: String,
    #[prost(string, tag = "5")]
    pub amount: String,
    #[prost(string, tag = "6")]
    pub amount_display: String,
    #[prost(string, tag = "7")]
    pub payment_mode: String,
    #[prost(string, tag = "8")]
    pub collected_by: String,
    #[prost(string, tag = "9")]
    pub collected_on: String,
    #[prost(string, tag = "10")]
    pub collected_on_display: String,
    #[prost(string, tag = "11")]
    pub note: String,
    #[prost(message, optional, tag = "12")]
    pub notification: Option<DeliveryResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionListResponse {
    #[prost(message, repeated, tag = "1")]
    pub collections: Vec<CollectionResponse>,
    #[prost(string, tag = "2")]
    pub total: String,
    #[prost(string, tag = "3")]
    pub total_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordPaymentRequest {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub member_username: String,
    #[prost(string, tag = "3")]
    pub amount: String,
    #[prost(string, tag = "4")]
    pub payment_mode: String,
    #[prost(string, tag = "5")]
    pub paid_by: String,
    #[prost(string, tag = "6")]
    pub paid_on: String,
    #[prost(string, tag = "7")]
    pub note: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PaymentResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub group_id: String,
    #[prost(string, tag = "3")]
    pub member_username: String,
    #[prost(string, tag = "4")]
    pub amount: String,
    #[prost(string, tag = "5")]
    pub amount_display: String,
    #[prost(string, tag = "6")]
    pub payment_mode: String,
    #[prost(string, tag = "7")]
    pub paid_by: String,
    #[prost(string, tag = "8")]
    pub paid_on: String,
    #[prost(string, tag = "9")]
    pub note: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PaymentListResponse {
    #[prost(message, repeated, tag = "1")]
    pub payments: Vec<PaymentResponse>,
    #[prost(string, tag = "2")]
    pub total: String,
    #[prost(string, tag = "3")]
    pub total_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordSalaryRequest {
    #[prost(string, tag = "1")]
    pub employee_id: String,
    #[prost(string, tag = "2")]
    pub amount: String,
    /// YYYY-MM
    #[prost(string, tag = "3")]
    pub salary_month: String,
    #[prost(string, tag = "4")]
    pub paid_on: String,
    #[prost(string, tag = "5")]
    pub note: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SalaryResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub employee_id: String,
    #[prost(string, tag = "3")]
    pub amount: String,
    #[prost(string, tag = "4")]
    pub amount_display: String,
    #[prost(string, tag = "5")]
    pub salary_month: String,
    #[prost(string, tag = "6")]
    pub paid_on: String,
    #[prost(string, tag = "7")]
    pub note: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SalaryListResponse {
    #[prost(message, repeated, tag = "1")]
    pub salaries: Vec<SalaryResponse>,
    #[prost(string, tag = "2")]
    pub total: String,
    #[prost(string, tag = "3")]
    pub total_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordExpenseRequest {
    #[prost(string, tag = "1")]
    pub category: String,
    #[prost(string, tag = "2")]
    pub amount: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub spent_by: String,
    #[prost(string, tag = "5")]
    pub spent_on: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExpenseResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub category: String,
    #[prost(string, tag = "3")]
    pub amount: String,
    #[prost(string, tag = "4")]
    pub amount_display: String,
    #[prost(string, tag = "5")]
    pub description: String,
    #[prost(string, tag = "6")]
    pub spent_by: String,
    #[prost(string, tag = "7")]
    pub spent_on: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListExpensesRequest {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(string, tag = "2")]
    pub to: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExpenseListResponse {
    #[prost(message, repeated, tag = "1")]
    pub expenses: Vec<ExpenseResponse>,
    #[prost(string, tag = "2")]
    pub total: String,
    #[prost(string, tag = "3")]
    pub total_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordCreditRequest {
    #[prost(string, tag = "1")]
    pub employee_id: String,
    #[prost(string, tag = "2")]
    pub amount: String,
    /// "received" or "sent"
    #[prost(string, tag = "3")]
    pub direction: String,
    #[prost(string, tag = "4")]
    pub note: String,
    #[prost(string, tag = "5")]
    pub credited_on: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreditResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub employee_id: String,
    #[prost(string, tag = "3")]
    pub amount: String,
    #[prost(string, tag = "4")]
    pub amount_display: String,
    #[prost(string, tag = "5")]
    pub direction: String,
    #[prost(string, tag = "6")]
    pub note: String,
    #[prost(string, tag = "7")]
    pub credited_on: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreditListResponse {
    #[prost(message, repeated, tag = "1")]
    pub credits: Vec<CreditResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordAuctionRequest {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(int32, tag = "2")]
    pub month_number: i32,
    #[prost(string, tag = "3")]
    pub winner_username: String,
    #[prost(string, tag = "4")]
    pub bid_amount: String,
    #[prost(string, tag = "5")]
    pub auction_date: String,
    /// Announce the result to every group member
    #[prost(bool, tag = "6")]
    pub notify: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuctionResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub group_id: String,
    #[prost(int32, tag = "3")]
    pub month_number: i32,
    #[prost(string, tag = "4")]
    pub winner_username: String,
    #[prost(string, tag = "5")]
    pub bid_amount: String,
    #[prost(string, tag = "6")]
    pub bid_amount_display: String,
    #[prost(string, tag = "7")]
    pub payout_amount: String,
    #[prost(string, tag = "8")]
    pub payout_amount_display: String,
    #[prost(string, tag = "9")]
    pub dividend_per_member: String,
    #[prost(string, tag = "10")]
    pub dividend_per_member_display: String,
    #[prost(string, tag = "11")]
    pub auction_date: String,
    #[prost(message, repeated, tag = "12")]
    pub notifications: Vec<DeliveryResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuctionListResponse {
    #[prost(message, repeated, tag = "1")]
    pub auctions: Vec<AuctionResponse>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AdminOverviewResponse {
    #[prost(uint32, tag = "1")]
    pub total_groups: u32,
    #[prost(uint32, tag = "2")]
    pub active_groups: u32,
    #[prost(uint32, tag = "3")]
    pub closed_groups: u32,
    #[prost(int64, tag = "4")]
    pub member_count: i64,
    #[prost(int64, tag = "5")]
    pub employee_count: i64,
    #[prost(string, tag = "6")]
    pub total_collected: String,
    #[prost(string, tag = "7")]
    pub total_collected_display: String,
    #[prost(string, tag = "8")]
    pub total_paid_out: String,
    #[prost(string, tag = "9")]
    pub total_paid_out_display: String,
    #[prost(string, tag = "10")]
    pub total_expenses: String,
    #[prost(string, tag = "11")]
    pub total_expenses_display: String,
    #[prost(string, tag = "12")]
    pub total_salaries: String,
    #[prost(string, tag = "13")]
    pub total_salaries_display: String,
    #[prost(string, tag = "14")]
    pub net_cash: String,
    #[prost(string, tag = "15")]
    pub net_cash_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MemberTotalEntry {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(string, tag = "2")]
    pub collected: String,
    #[prost(string, tag = "3")]
    pub collected_display: String,
    #[prost(uint32, tag = "4")]
    pub installments_paid: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GroupSummaryResponse {
    #[prost(message, optional, tag = "1")]
    pub group: Option<GroupResponse>,
    #[prost(uint32, tag = "2")]
    pub installments_due: u32,
    #[prost(string, tag = "3")]
    pub total_collected: String,
    #[prost(string, tag = "4")]
    pub total_collected_display: String,
    #[prost(string, tag = "5")]
    pub expected_to_date: String,
    #[prost(string, tag = "6")]
    pub expected_to_date_display: String,
    #[prost(string, tag = "7")]
    pub outstanding: String,
    #[prost(string, tag = "8")]
    pub outstanding_display: String,
    #[prost(string, tag = "9")]
    pub term_target: String,
    #[prost(string, tag = "10")]
    pub term_target_display: String,
    #[prost(string, tag = "11")]
    pub progress_percent: String,
    #[prost(message, repeated, tag = "12")]
    pub member_totals: Vec<MemberTotalEntry>,
    #[prost(message, repeated, tag = "13")]
    pub auctions: Vec<AuctionResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MemberHistoryRequest {
    /// Blank for members means their own history
    #[prost(string, tag = "1")]
    pub username: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HistoryEntryResponse {
    /// "collection" or "payout"
    #[prost(string, tag = "1")]
    pub kind: String,
    #[prost(string, tag = "2")]
    pub record_id: String,
    #[prost(string, tag = "3")]
    pub group_id: String,
    #[prost(string, tag = "4")]
    pub amount: String,
    #[prost(string, tag = "5")]
    pub amount_display: String,
    #[prost(string, tag = "6")]
    pub date: String,
    #[prost(string, tag = "7")]
    pub date_display: String,
    #[prost(string, tag = "8")]
    pub payment_mode: String,
    /// Zero for payouts
    #[prost(int64, tag = "9")]
    pub receipt_no: i64,
    #[prost(string, tag = "10")]
    pub note: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MemberHistoryResponse {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<HistoryEntryResponse>,
    #[prost(string, tag = "2")]
    pub total_paid: String,
    #[prost(string, tag = "3")]
    pub total_paid_display: String,
    #[prost(string, tag = "4")]
    pub total_received: String,
    #[prost(string, tag = "5")]
    pub total_received_display: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmployeeBalanceResponse {
    #[prost(string, tag = "1")]
    pub employee_id: String,
    #[prost(string, tag = "2")]
    pub received: String,
    #[prost(string, tag = "3")]
    pub received_display: String,
    #[prost(string, tag = "4")]
    pub sent: String,
    #[prost(string, tag = "5")]
    pub sent_display: String,
    #[prost(string, tag = "6")]
    pub balance: String,
    #[prost(string, tag = "7")]
    pub balance_display: String,
    #[prost(uint32, tag = "8")]
    pub collections_count: u32,
    #[prost(string, tag = "9")]
    pub collections_total: String,
    #[prost(string, tag = "10")]
    pub collections_total_display: String,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendNotificationRequest {
    #[prost(string, tag = "1")]
    pub phone: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NotificationResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<DeliveryResult>,
    #[prost(uint32, tag = "2")]
    pub delivered_count: u32,
    #[prost(bool, tag = "3")]
    pub simulated: bool,
}

include!(concat!(env!("OUT_DIR"), "/chitconnect.ChitService.rs"));
