#![allow(dead_code)]

use chitconnect_backend::auth::{self, Principal};
use chitconnect_backend::config::{AppConfig, DatabaseConfig, MessagingConfig};
use chitconnect_backend::database::{create_pool, run_migrations};
use chitconnect_backend::models::*;
use chitconnect_backend::AppState;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "secret123";

/// Test database plus a fully wired application state.
///
/// Tests share one database and run concurrently, so every fixture uses
/// unique usernames and phone numbers instead of truncating tables.
pub struct TestDatabase {
    pub pool: PgPool,
    pub state: Arc<AppState>,
}

impl TestDatabase {
    /// Connect to `TEST_DATABASE_URL`, or `None` when it is not set
    pub async fn try_new() -> Option<Self> {
        let database_url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => {
                eprintln!("TEST_DATABASE_URL not set, skipping database test");
                return None;
            }
        };

        let config = DatabaseConfig {
            url: database_url,
            max_connections: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 300,
            max_lifetime_secs: 600,
            test_before_acquire: true,
        };

        let pool = create_pool(&config)
            .await
            .expect("Failed to create test database pool");

        run_migrations(&pool, None)
            .await
            .expect("Failed to run migrations");

        let app_config = AppConfig {
            database: config,
            messaging: MessagingConfig::default(),
            audit_log_dir: std::env::temp_dir().join(format!("chitconnect-test-{}", Uuid::new_v4())),
            ..AppConfig::default()
        };
        let state = AppState::new(pool.clone(), &app_config).expect("Failed to build app state");

        Some(Self {
            pool,
            state: Arc::new(state),
        })
    }
}

/// Lowercase username unique to this test run
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

/// Indian mobile number unique to this test run
pub fn unique_phone() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("+919{:09}", n)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn principal_for_user(user: &User) -> Principal {
    Principal {
        subject_id: user.id,
        role: user.role_enum(),
        name: user.name.clone(),
        username: Some(user.username.clone()),
    }
}

pub fn principal_for_employee(employee: &Employee) -> Principal {
    Principal {
        subject_id: employee.id,
        role: Role::Employee,
        name: employee.name.clone(),
        username: None,
    }
}

/// Insert a user straight through the repository
pub async fn create_test_user(db: &TestDatabase, prefix: &str, role: Role) -> User {
    let username = unique_username(prefix);
    db.state
        .user_repo
        .create(
            &format!("Test {}", prefix),
            &username,
            &unique_phone(),
            &auth::hash_password(TEST_PASSWORD),
            role,
            None,
        )
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_admin(db: &TestDatabase) -> (User, Principal) {
    let admin = create_test_user(db, "admin", Role::Admin).await;
    let principal = principal_for_user(&admin);
    (admin, principal)
}

pub async fn create_test_employee(db: &TestDatabase) -> (Employee, Principal) {
    let employee = db
        .state
        .employee_repo
        .create(
            "Test Collector",
            &unique_phone(),
            &auth::hash_password(TEST_PASSWORD),
            "collector",
            dec("15000"),
        )
        .await
        .expect("Failed to create test employee");
    let principal = principal_for_employee(&employee);
    (employee, principal)
}

/// A group that started `months_ago` months back, with `members`
pub async fn create_test_group(db: &TestDatabase, members: &[&User], months_ago: u32, duration: i32) -> Group {
    let start_date = chitconnect_backend::format::today()
        .checked_sub_months(Months::new(months_ago))
        .unwrap();
    db.state
        .group_repo
        .create(&NewGroup {
            name: unique_username("group"),
            total_amount: dec("100000"),
            monthly_installment: dec("5000"),
            duration_months: duration,
            start_date,
            members: members.iter().map(|m| m.username.clone()).collect(),
        })
        .await
        .expect("Failed to create test group")
}

pub fn collection_input(group: &Group, member: &User, amount: &str) -> NewCollection {
    NewCollection {
        group_id: group.id,
        member_username: member.username.clone(),
        amount: dec(amount),
        payment_mode: PaymentMode::Cash,
        collected_by: None,
        collected_on: chitconnect_backend::format::today(),
        note: None,
    }
}
