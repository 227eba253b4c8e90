mod helpers;

use chitconnect_backend::grpc_service::ChitGrpcService;
use chitconnect_backend::models::*;
use chitconnect_backend::proto::chit_service_server::ChitService;
use chitconnect_backend::proto::*;
use helpers::*;
use tonic::{Code, Request};

fn authed<T>(token: &str, message: T) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert(
        "authorization",
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

async fn login(service: &ChitGrpcService, phone: &str, password: &str) -> String {
    service
        .login(Request::new(LoginRequest {
            phone: phone.to_string(),
            password: password.to_string(),
        }))
        .await
        .expect("login failed")
        .into_inner()
        .token
}

/// End-to-end test: admin sets up a group, an employee collects, the
/// admin runs an auction and the member reads their history
#[tokio::test]
async fn test_complete_e2e_flow() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let service = ChitGrpcService::new(db.state.clone());

    // Step 1: Admin logs in
    let admin = create_test_user(&db, "office", Role::Admin).await;
    let admin_token = login(&service, &admin.phone, TEST_PASSWORD).await;

    let me = service
        .who_am_i(authed(&admin_token, Empty {}))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(me.role, "admin");
    assert_eq!(me.username, admin.username);

    // Step 2: Admin creates members and an employee
    let mut usernames = Vec::new();
    let mut member_phone = String::new();
    for name in ["Anil", "Bina"] {
        let phone = unique_phone();
        let user = service
            .create_user(authed(
                &admin_token,
                CreateUserRequest {
                    name: name.to_string(),
                    username: unique_username(&name.to_lowercase()),
                    phone: phone.clone(),
                    password: TEST_PASSWORD.to_string(),
                    role: String::new(),
                    address: "Chennai".to_string(),
                },
            ))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(user.role, "member");
        if member_phone.is_empty() {
            member_phone = phone;
        }
        usernames.push(user.username);
    }

    let employee_phone = unique_phone();
    let employee = service
        .create_employee(authed(
            &admin_token,
            CreateEmployeeRequest {
                name: "Ravi".to_string(),
                phone: employee_phone.clone(),
                password: TEST_PASSWORD.to_string(),
                designation: "collector".to_string(),
                monthly_salary: "15,000".to_string(),
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(employee.monthly_salary_display, "₹15,000.00");

    // Step 3: Admin creates the group
    let group = service
        .create_group(authed(
            &admin_token,
            CreateGroupRequest {
                name: unique_username("pongal"),
                total_amount: "1,00,000".to_string(),
                monthly_installment: "5000".to_string(),
                duration_months: 20,
                start_date: String::new(),
                members: usernames.clone(),
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(group.total_amount_display, "₹1,00,000.00");
    assert!(!group.is_closed);
    assert_eq!(group.members.len(), 2);

    // Step 4: Employee logs in and records a collection with a receipt
    let employee_token = login(&service, &employee_phone, TEST_PASSWORD).await;
    let collection = service
        .record_collection(authed(
            &employee_token,
            RecordCollectionRequest {
                group_id: group.id.clone(),
                member_username: usernames[0].clone(),
                amount: "5000".to_string(),
                payment_mode: "upi".to_string(),
                collected_by: String::new(),
                collected_on: String::new(),
                note: String::new(),
                notify: true,
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(collection.collected_by, employee.id);
    assert_eq!(collection.amount_display, "₹5,000.00");
    let receipt = collection.notification.expect("receipt notification");
    assert!(receipt.sms_sid.starts_with("SIM-"));
    assert!(receipt.whatsapp_sid.starts_with("SIM-"));

    // Employees cannot run auctions
    let denied = service
        .record_auction(authed(
            &employee_token,
            RecordAuctionRequest {
                group_id: group.id.clone(),
                month_number: 1,
                winner_username: usernames[1].clone(),
                bid_amount: "8000".to_string(),
                auction_date: String::new(),
                notify: false,
            },
        ))
        .await
        .unwrap_err();
    assert_eq!(denied.code(), Code::PermissionDenied);

    // Step 5: Admin records the auction and announces it
    let auction = service
        .record_auction(authed(
            &admin_token,
            RecordAuctionRequest {
                group_id: group.id.clone(),
                month_number: 1,
                winner_username: usernames[1].clone(),
                bid_amount: "8000".to_string(),
                auction_date: String::new(),
                notify: true,
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(auction.payout_amount_display, "₹92,000.00");
    assert_eq!(auction.dividend_per_member_display, "₹4,000.00");
    assert_eq!(auction.notifications.len(), 2);

    let resent = service
        .send_auction_notification(authed(&admin_token, IdRequest { id: auction.id.clone() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resent.delivered_count, 2);
    assert!(resent.simulated);

    // Step 6: Member reads their own history and the group summary
    let member_token = login(&service, &member_phone, TEST_PASSWORD).await;
    let history = service
        .get_member_history(authed(&member_token, MemberHistoryRequest { username: String::new() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.entries[0].kind, "collection");
    assert_eq!(history.entries[0].receipt_no, collection.receipt_no);
    assert_eq!(history.total_paid_display, "₹5,000.00");

    let summary = service
        .get_group_summary(authed(&member_token, IdRequest { id: group.id.clone() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(summary.member_totals.len(), 1);
    assert_eq!(summary.auctions.len(), 1);

    let forbidden = service
        .get_admin_overview(authed(&member_token, Empty {}))
        .await
        .unwrap_err();
    assert_eq!(forbidden.code(), Code::PermissionDenied);

    // Step 7: Logout ends the session
    service.logout(authed(&member_token, Empty {})).await.unwrap();
    let expired = service
        .who_am_i(authed(&member_token, Empty {}))
        .await
        .unwrap_err();
    assert_eq!(expired.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let service = ChitGrpcService::new(db.state.clone());

    let status = service.list_groups(Request::new(Empty {})).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let status = service
        .list_groups(authed("not-a-real-token", Empty {}))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn test_invalid_input_maps_to_invalid_argument() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let service = ChitGrpcService::new(db.state.clone());

    let admin = create_test_user(&db, "office", Role::Admin).await;
    let token = login(&service, &admin.phone, TEST_PASSWORD).await;

    let bad_id = service
        .get_group(authed(&token, IdRequest { id: "group-1".to_string() }))
        .await
        .unwrap_err();
    assert_eq!(bad_id.code(), Code::InvalidArgument);

    let bad_amount = service
        .create_group(authed(
            &token,
            CreateGroupRequest {
                name: "Bad".to_string(),
                total_amount: "lots".to_string(),
                monthly_installment: "5000".to_string(),
                duration_months: 10,
                start_date: String::new(),
                members: Vec::new(),
            },
        ))
        .await
        .unwrap_err();
    assert_eq!(bad_amount.code(), Code::InvalidArgument);

    let missing = service
        .get_group(authed(&token, IdRequest { id: uuid::Uuid::new_v4().to_string() }))
        .await
        .unwrap_err();
    assert_eq!(missing.code(), Code::NotFound);
}
