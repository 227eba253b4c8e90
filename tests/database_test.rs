mod helpers;

use chitconnect_backend::auth;
use chitconnect_backend::error::RepositoryError;
use chitconnect_backend::models::*;
use helpers::*;
use rust_decimal::Decimal;
use sqlx::Row;
use uuid::Uuid;

// ============================================================================
// Connection Pool and Migration Tests
// ============================================================================

#[tokio::test]
async fn test_connection_pool_query() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let row = sqlx::query("SELECT 1 as test")
        .fetch_one(&db.pool)
        .await
        .expect("Query failed");
    let value: i32 = row.get("test");
    assert_eq!(value, 1);

    db.state.database.ping().await.expect("Ping failed");
}

#[tokio::test]
async fn test_migrations_ran() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let tables = [
        "users",
        "employees",
        "chit_groups",
        "collections",
        "payments",
        "salaries",
        "expenses",
        "credits",
        "auctions",
        "sessions",
        "counters",
    ];

    for table in tables {
        let exists: bool = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&db.pool)
        .await
        .expect("Query failed")
        .get(0);
        assert!(exists, "Table {} should exist", table);
    }
}

// ============================================================================
// User and Employee Repository Tests
// ============================================================================

#[tokio::test]
async fn test_user_create_and_find() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let user = create_test_user(&db, "member", Role::Member).await;
    assert!(!user.id.is_nil());
    assert_eq!(user.role_enum(), Role::Member);

    let by_phone = db.state.user_repo.find_by_phone(&user.phone).await.unwrap();
    assert_eq!(by_phone.map(|u| u.id), Some(user.id));

    let by_username = db.state.user_repo.find_by_username(&user.username).await.unwrap();
    assert_eq!(by_username.map(|u| u.id), Some(user.id));

    let missing = db
        .state
        .user_repo
        .find_by_id(Uuid::new_v4())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let user = create_test_user(&db, "dup", Role::Member).await;
    let result = db
        .state
        .user_repo
        .create(
            "Another",
            &user.username,
            &unique_phone(),
            &auth::hash_password(TEST_PASSWORD),
            Role::Member,
            None,
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::Duplicate(_))));
}

#[tokio::test]
async fn test_missing_usernames() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let user = create_test_user(&db, "known", Role::Member).await;
    let ghost = unique_username("ghost");

    let missing = db
        .state
        .user_repo
        .missing_usernames(&[user.username.clone(), ghost.clone()])
        .await
        .unwrap();
    assert_eq!(missing, vec![ghost]);
}

#[tokio::test]
async fn test_update_profile_and_delete() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let user = create_test_user(&db, "edit", Role::Member).await;
    let phone = unique_phone();
    let updated = db
        .state
        .user_repo
        .update_profile(user.id, "Renamed", &phone, Some("12 MG Road"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.phone, phone);
    assert_eq!(updated.address.as_deref(), Some("12 MG Road"));

    assert!(db.state.user_repo.delete(user.id).await.unwrap());
    assert!(!db.state.user_repo.delete(user.id).await.unwrap());
}

#[tokio::test]
async fn test_employee_deactivation() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let (employee, _) = create_test_employee(&db).await;
    assert!(employee.active);

    let deactivated = db.state.employee_repo.set_active(employee.id, false).await.unwrap();
    assert!(!deactivated.active);

    let result = db.state.employee_repo.set_active(Uuid::new_v4(), false).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

// ============================================================================
// Group Repository Tests
// ============================================================================

#[tokio::test]
async fn test_group_membership() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let anil = create_test_user(&db, "anil", Role::Member).await;
    let bina = create_test_user(&db, "bina", Role::Member).await;
    let group = create_test_group(&db, &[&anil], 0, 20).await;
    assert_eq!(group.status_enum(), GroupStatus::Active);
    assert_eq!(group.members, vec![anil.username.clone()]);

    let group = db.state.group_repo.add_member(group.id, &bina.username).await.unwrap();
    assert_eq!(group.members.len(), 2);

    // Adding twice keeps one entry
    let group = db.state.group_repo.add_member(group.id, &bina.username).await.unwrap();
    assert_eq!(group.members.len(), 2);

    let for_bina = db.state.group_repo.list_for_member(&bina.username).await.unwrap();
    assert!(for_bina.iter().any(|g| g.id == group.id));

    let group = db.state.group_repo.remove_member(group.id, &anil.username).await.unwrap();
    assert_eq!(group.members, vec![bina.username.clone()]);

    let closed = db.state.group_repo.set_status(group.id, GroupStatus::Closed).await.unwrap();
    assert_eq!(closed.status_enum(), GroupStatus::Closed);
}

// ============================================================================
// Ledger Repository Tests
// ============================================================================

#[tokio::test]
async fn test_collection_receipts_increase() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let member = create_test_user(&db, "payer", Role::Member).await;
    let group = create_test_group(&db, &[&member], 1, 20).await;

    let first = db
        .state
        .collection_repo
        .create(&collection_input(&group, &member, "5000"))
        .await
        .unwrap();
    let second = db
        .state
        .collection_repo
        .create(&collection_input(&group, &member, "5000"))
        .await
        .unwrap();

    assert!(first.receipt_no > 1000);
    assert!(second.receipt_no > first.receipt_no);

    let found = db.state.collection_repo.find_by_receipt(second.receipt_no).await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(second.id));

    let total = db.state.collection_repo.total_by_group(group.id).await.unwrap();
    assert_eq!(total, dec("10000"));
}

#[tokio::test]
async fn test_concurrent_receipts_are_unique() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let member = create_test_user(&db, "rush", Role::Member).await;
    let group = create_test_group(&db, &[&member], 0, 12).await;

    let inserts = (0..8).map(|_| {
        let repo = db.state.collection_repo.clone();
        let input = collection_input(&group, &member, "100");
        async move { repo.create(&input).await }
    });
    let results = futures::future::join_all(inserts).await;

    let mut receipts: Vec<i64> = results.into_iter().map(|r| r.unwrap().receipt_no).collect();
    receipts.sort();
    receipts.dedup();
    assert_eq!(receipts.len(), 8);
}

#[tokio::test]
async fn test_credit_totals_by_employee() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let (employee, _) = create_test_employee(&db).await;
    for (amount, direction) in [
        ("3000", CreditDirection::Received),
        ("2000", CreditDirection::Received),
        ("1500", CreditDirection::Sent),
    ] {
        db.state
            .credit_repo
            .create(&NewCredit {
                employee_id: employee.id,
                amount: dec(amount),
                direction,
                note: None,
                credited_on: date(2024, 3, 1),
            })
            .await
            .unwrap();
    }

    let totals = db.state.credit_repo.totals_by_employee(employee.id).await.unwrap();
    assert_eq!(totals.received, dec("5000"));
    assert_eq!(totals.sent, dec("1500"));
    assert_eq!(totals.balance(), dec("3500"));

    let (other, _) = create_test_employee(&db).await;
    let empty = db.state.credit_repo.totals_by_employee(other.id).await.unwrap();
    assert_eq!(empty.balance(), Decimal::ZERO);
}

#[tokio::test]
async fn test_auction_month_unique_per_group() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let a = create_test_user(&db, "bidder", Role::Member).await;
    let b = create_test_user(&db, "bidder", Role::Member).await;
    let group = create_test_group(&db, &[&a, &b], 2, 20).await;

    let auction = NewAuction {
        group_id: group.id,
        month_number: 1,
        winner_username: a.username.clone(),
        bid_amount: dec("8000"),
        payout_amount: dec("92000"),
        dividend_per_member: dec("4000"),
        auction_date: date(2024, 1, 10),
    };
    db.state.auction_repo.create(&auction).await.unwrap();

    let again = db
        .state
        .auction_repo
        .create(&NewAuction {
            winner_username: b.username.clone(),
            ..auction
        })
        .await;
    assert!(matches!(again, Err(RepositoryError::BusinessRule(_))));

    let listed = db.state.auction_repo.list_by_group(group.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_auction_winner_unique_per_group() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let a = create_test_user(&db, "winner", Role::Member).await;
    let b = create_test_user(&db, "winner", Role::Member).await;
    let group = create_test_group(&db, &[&a, &b], 2, 20).await;

    let auction = |month_number: i32| NewAuction {
        group_id: group.id,
        month_number,
        winner_username: a.username.clone(),
        bid_amount: dec("8000"),
        payout_amount: dec("92000"),
        dividend_per_member: dec("4000"),
        auction_date: date(2024, 1, 10),
    };
    let (first, second) = (auction(1), auction(2));
    let results = futures::future::join_all([
        db.state.auction_repo.create(&first),
        db.state.auction_repo.create(&second),
    ])
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(RepositoryError::BusinessRule(msg)) if msg.contains("already won"))));

    let listed = db.state.auction_repo.list_by_group(group.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_expense_date_range() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let category = unique_username("cat");
    for (day, amount) in [(1, "100"), (15, "200"), (28, "300")] {
        db.state
            .expense_repo
            .create(&NewExpense {
                category: category.clone(),
                amount: dec(amount),
                description: "Office supplies".to_string(),
                spent_by: None,
                spent_on: date(2031, 2, day),
            })
            .await
            .unwrap();
    }

    let mid_month = db
        .state
        .expense_repo
        .list(Some(date(2031, 2, 10)), Some(date(2031, 2, 20)))
        .await
        .unwrap();
    let ours: Vec<_> = mid_month.iter().filter(|e| e.category == category).collect();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].amount, dec("200"));
}

// ============================================================================
// Session Repository Tests
// ============================================================================

#[tokio::test]
async fn test_session_expiry() {
    let Some(db) = TestDatabase::try_new().await else { return };

    let user = create_test_user(&db, "sess", Role::Member).await;
    let now = chrono::Utc::now().naive_utc();
    let live = auth::hash_session_token(&auth::generate_session_token());
    let stale = auth::hash_session_token(&auth::generate_session_token());

    db.state
        .session_repo
        .create(&live, user.id, Role::Member, now + chrono::Duration::hours(1))
        .await
        .unwrap();
    db.state
        .session_repo
        .create(&stale, user.id, Role::Member, now - chrono::Duration::hours(1))
        .await
        .unwrap();

    assert!(db.state.session_repo.find_valid(&live, now).await.unwrap().is_some());
    assert!(db.state.session_repo.find_valid(&stale, now).await.unwrap().is_none());

    let purged = db.state.session_repo.purge_expired(now).await.unwrap();
    assert!(purged >= 1);

    assert_eq!(db.state.session_repo.delete_for_subject(user.id).await.unwrap(), 1);
}
