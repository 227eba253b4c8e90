//! Domain models for the ChitConnect backend.
//!
//! Flat, database-backed records. Cross-record consistency (for example
//! total collected against a group's total amount) is computed at read
//! time by the report service.

pub mod auction;
pub mod collection;
pub mod credit;
pub mod employee;
pub mod expense;
pub mod group;
pub mod payment;
pub mod salary;
pub mod session;
pub mod user;

// Re-export all models for convenient access
pub use auction::{auction_terms, AuctionRecord, NewAuction};
pub use collection::{CollectionRecord, NewCollection, PaymentMode};
pub use credit::{CreditDirection, CreditRecord, CreditTotals, NewCredit};
pub use employee::{Employee, NewEmployee};
pub use expense::{ExpenseRecord, NewExpense};
pub use group::{Group, GroupStatus, NewGroup};
pub use payment::{NewPayment, PaymentRecord};
pub use salary::{is_valid_salary_month, NewSalary, SalaryRecord};
pub use session::Session;
pub use user::{NewUser, Role, User};
