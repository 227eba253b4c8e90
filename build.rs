use tonic_build::manual::{Builder, Method, Service};

/// (rust method name, gRPC route name, request message, response message)
const METHODS: &[(&str, &str, &str, &str)] = &[
    ("login", "Login", "LoginRequest", "LoginResponse"),
    ("logout", "Logout", "Empty", "Ack"),
    ("who_am_i", "WhoAmI", "Empty", "PrincipalResponse"),
    ("change_password", "ChangePassword", "ChangePasswordRequest", "Ack"),
    ("create_user", "CreateUser", "CreateUserRequest", "UserResponse"),
    ("list_users", "ListUsers", "ListUsersRequest", "UserListResponse"),
    ("get_user", "GetUser", "IdRequest", "UserResponse"),
    ("update_user", "UpdateUser", "UpdateUserRequest", "UserResponse"),
    ("delete_user", "DeleteUser", "IdRequest", "Ack"),
    ("create_employee", "CreateEmployee", "CreateEmployeeRequest", "EmployeeResponse"),
    ("list_employees", "ListEmployees", "Empty", "EmployeeListResponse"),
    ("get_employee", "GetEmployee", "IdRequest", "EmployeeResponse"),
    ("deactivate_employee", "DeactivateEmployee", "IdRequest", "EmployeeResponse"),
    ("create_group", "CreateGroup", "CreateGroupRequest", "GroupResponse"),
    ("list_groups", "ListGroups", "Empty", "GroupListResponse"),
    ("get_group", "GetGroup", "IdRequest", "GroupResponse"),
    ("add_group_member", "AddGroupMember", "GroupMemberRequest", "GroupResponse"),
    ("remove_group_member", "RemoveGroupMember", "GroupMemberRequest", "GroupResponse"),
    ("close_group", "CloseGroup", "IdRequest", "GroupResponse"),
    ("record_collection", "RecordCollection", "RecordCollectionRequest", "CollectionResponse"),
    ("list_collections", "ListCollections", "ListRecordsRequest", "CollectionListResponse"),
    ("record_payment", "RecordPayment", "RecordPaymentRequest", "PaymentResponse"),
    ("list_payments", "ListPayments", "ListRecordsRequest", "PaymentListResponse"),
    ("record_salary", "RecordSalary", "RecordSalaryRequest", "SalaryResponse"),
    ("list_salaries", "ListSalaries", "ListRecordsRequest", "SalaryListResponse"),
    ("record_expense", "RecordExpense", "RecordExpenseRequest", "ExpenseResponse"),
    ("list_expenses", "ListExpenses", "ListExpensesRequest", "ExpenseListResponse"),
    ("record_credit", "RecordCredit", "RecordCreditRequest", "CreditResponse"),
    ("list_credits", "ListCredits", "ListRecordsRequest", "CreditListResponse"),
    ("record_auction", "RecordAuction", "RecordAuctionRequest", "AuctionResponse"),
    ("list_auctions", "ListAuctions", "ListRecordsRequest", "AuctionListResponse"),
    ("get_admin_overview", "GetAdminOverview", "Empty", "AdminOverviewResponse"),
    ("get_group_summary", "GetGroupSummary", "IdRequest", "GroupSummaryResponse"),
    ("get_member_history", "GetMemberHistory", "MemberHistoryRequest", "MemberHistoryResponse"),
    ("get_employee_balance", "GetEmployeeBalance", "IdRequest", "EmployeeBalanceResponse"),
    ("send_notification", "SendNotification", "SendNotificationRequest", "NotificationResponse"),
    ("send_auction_notification", "SendAuctionNotification", "IdRequest", "NotificationResponse"),
];

fn main() {
    // Service definition lives here, rerun only when it changes
    println!("cargo:rerun-if-changed=build.rs");

    // Migrations are read from ./migrations at start-up by sqlx::migrate::Migrator
    println!("cargo:rerun-if-changed=migrations");

    let mut service = Service::builder()
        .name("ChitService")
        .package("chitconnect");

    for (name, route, input, output) in METHODS {
        service = service.method(
            Method::builder()
                .name(*name)
                .route_name(*route)
                .input_type(format!("crate::proto::{}", input))
                .output_type(format!("crate::proto::{}", output))
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        );
    }

    Builder::new()
        .build_server(true)
        .build_client(true)
        .compile(&[service.build()]);
}
