//! Read-time aggregates over flat records.
//!
//! Nothing here touches the database: the report service loads records and
//! hands them to these functions, which keeps the arithmetic testable.

use crate::models::{AuctionRecord, CollectionRecord, CreditTotals, Group, PaymentRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Whole-business snapshot for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminOverview {
    pub total_groups: usize,
    pub active_groups: usize,
    pub closed_groups: usize,
    pub member_count: i64,
    pub employee_count: i64,
    pub total_collected: Decimal,
    pub total_paid_out: Decimal,
    pub total_expenses: Decimal,
    pub total_salaries: Decimal,
    pub net_cash: Decimal,
}

/// Ledger totals fed into [`admin_overview`]
#[derive(Debug, Clone, Default)]
pub struct LedgerTotals {
    pub collected: Decimal,
    pub paid_out: Decimal,
    pub expenses: Decimal,
    pub salaries: Decimal,
}

/// Count (active, closed) groups as of `today`
pub fn classify_groups(groups: &[Group], today: NaiveDate) -> (usize, usize) {
    groups.iter().fold((0, 0), |(active, closed), g| {
        if g.is_closed_on(today) {
            (active, closed + 1)
        } else {
            (active + 1, closed)
        }
    })
}

pub fn admin_overview(
    groups: &[Group],
    member_count: i64,
    employee_count: i64,
    totals: &LedgerTotals,
    today: NaiveDate,
) -> AdminOverview {
    let (active_groups, closed_groups) = classify_groups(groups, today);
    AdminOverview {
        total_groups: groups.len(),
        active_groups,
        closed_groups,
        member_count,
        employee_count,
        total_collected: totals.collected,
        total_paid_out: totals.paid_out,
        total_expenses: totals.expenses,
        total_salaries: totals.salaries,
        net_cash: totals.collected - totals.paid_out - totals.expenses - totals.salaries,
    }
}

/// Amount collected from one member of a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberTotal {
    pub username: String,
    pub collected: Decimal,
    pub installments_paid: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: Group,
    pub is_closed: bool,
    pub installments_due: u32,
    pub total_collected: Decimal,
    pub expected_to_date: Decimal,
    pub outstanding: Decimal,
    /// Collections over the full term: installment x members x months
    pub term_target: Decimal,
    pub progress_percent: Decimal,
    pub member_totals: Vec<MemberTotal>,
    pub auctions: Vec<AuctionRecord>,
}

pub fn summarize_group(
    group: Group,
    collections: &[CollectionRecord],
    mut auctions: Vec<AuctionRecord>,
    today: NaiveDate,
) -> GroupSummary {
    let relevant = collections.iter().filter(|c| c.group_id == group.id);

    let mut by_member: HashMap<&str, (Decimal, usize)> = HashMap::new();
    let mut total_collected = Decimal::ZERO;
    for c in relevant {
        total_collected += c.amount;
        let entry = by_member.entry(c.member_username.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 += c.amount;
        entry.1 += 1;
    }

    // Current members first in their listed order, then anyone removed since
    let mut member_totals: Vec<MemberTotal> = group
        .members
        .iter()
        .map(|m| {
            let (collected, installments_paid) =
                by_member.get(m.as_str()).copied().unwrap_or((Decimal::ZERO, 0));
            MemberTotal {
                username: m.clone(),
                collected,
                installments_paid,
            }
        })
        .collect();
    let mut former: Vec<MemberTotal> = by_member
        .iter()
        .filter(|(name, _)| !group.has_member(name))
        .map(|(name, (collected, count))| MemberTotal {
            username: name.to_string(),
            collected: *collected,
            installments_paid: *count,
        })
        .collect();
    former.sort_by(|a, b| a.username.cmp(&b.username));
    member_totals.extend(former);

    auctions.retain(|a| a.group_id == group.id);
    auctions.sort_by_key(|a| a.month_number);

    let expected_to_date = group.expected_collection_to(today);
    let outstanding = (expected_to_date - total_collected).max(Decimal::ZERO);
    let term_target = group.monthly_installment
        * Decimal::from(group.members.len() as u64)
        * Decimal::from(group.duration_months.max(0));
    let progress_percent = percent(total_collected, term_target);

    GroupSummary {
        is_closed: group.is_closed_on(today),
        installments_due: group.installments_due(today),
        group,
        total_collected,
        expected_to_date,
        outstanding,
        term_target,
        progress_percent,
        member_totals,
        auctions,
    }
}

/// `part / whole * 100`, 2 dp; zero when `whole` is zero
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Which side of the ledger a history entry is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Installment paid in by the member
    Collection,
    /// Money paid out to the member
    Payout,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Collection => "collection",
            HistoryKind::Payout => "payout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub record_id: Uuid,
    pub group_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub payment_mode: String,
    pub receipt_no: Option<i64>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemberHistory {
    pub entries: Vec<HistoryEntry>,
    pub total_paid: Decimal,
    pub total_received: Decimal,
}

/// Merge a member's collections and payouts, newest first
pub fn merge_history(collections: Vec<CollectionRecord>, payments: Vec<PaymentRecord>) -> MemberHistory {
    let total_paid = collections.iter().map(|c| c.amount).sum();
    let total_received = payments.iter().map(|p| p.amount).sum();

    let mut entries: Vec<HistoryEntry> = collections
        .into_iter()
        .map(|c| HistoryEntry {
            kind: HistoryKind::Collection,
            record_id: c.id,
            group_id: c.group_id,
            amount: c.amount,
            date: c.collected_on,
            payment_mode: c.payment_mode,
            receipt_no: Some(c.receipt_no),
            note: c.note,
            created_at: c.created_at,
        })
        .chain(payments.into_iter().map(|p| HistoryEntry {
            kind: HistoryKind::Payout,
            record_id: p.id,
            group_id: p.group_id,
            amount: p.amount,
            date: p.paid_on,
            payment_mode: p.payment_mode,
            receipt_no: None,
            note: p.note,
            created_at: p.created_at,
        }))
        .collect();

    entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    MemberHistory {
        entries,
        total_paid,
        total_received,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeBalance {
    pub employee_id: Uuid,
    pub received: Decimal,
    pub sent: Decimal,
    pub balance: Decimal,
    pub collections_count: usize,
    pub collections_total: Decimal,
}

pub fn employee_balance(
    employee_id: Uuid,
    totals: &CreditTotals,
    collections: &[CollectionRecord],
) -> EmployeeBalance {
    EmployeeBalance {
        employee_id,
        received: totals.received,
        sent: totals.sent,
        balance: totals.balance(),
        collections_count: collections.len(),
        collections_total: collections.iter().map(|c| c.amount).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn group(start: NaiveDate, months: i32, status: &str, members: &[&str]) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "Group".to_string(),
            total_amount: Decimal::new(50_000, 0),
            monthly_installment: Decimal::new(2_500, 0),
            duration_months: months,
            start_date: start,
            members: members.iter().map(|m| m.to_string()).collect(),
            status: status.to_string(),
            created_at: ts(2024, 1, 1, 0),
        }
    }

    fn collection(group_id: Uuid, member: &str, amount: i64, on: NaiveDate, receipt: i64) -> CollectionRecord {
        CollectionRecord {
            id: Uuid::new_v4(),
            receipt_no: receipt,
            group_id,
            member_username: member.to_string(),
            amount: Decimal::new(amount, 0),
            payment_mode: "cash".to_string(),
            collected_by: None,
            collected_on: on,
            note: None,
            created_at: on.and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    fn payment(group_id: Uuid, member: &str, amount: i64, on: NaiveDate) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            group_id,
            member_username: member.to_string(),
            amount: Decimal::new(amount, 0),
            payment_mode: "bank".to_string(),
            paid_by: None,
            paid_on: on,
            note: None,
            created_at: on.and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_classify_groups() {
        let today = date(2024, 6, 1);
        let groups = vec![
            group(date(2024, 1, 1), 12, "active", &["a"]),
            group(date(2023, 1, 1), 12, "active", &["a"]), // term over
            group(date(2024, 3, 1), 20, "closed", &["a"]),
        ];
        assert_eq!(classify_groups(&groups, today), (1, 2));
        assert_eq!(classify_groups(&[], today), (0, 0));
    }

    #[test]
    fn test_admin_overview_net_cash() {
        let totals = LedgerTotals {
            collected: Decimal::new(100_000, 0),
            paid_out: Decimal::new(60_000, 0),
            expenses: Decimal::new(5_000, 0),
            salaries: Decimal::new(15_000, 0),
        };
        let overview = admin_overview(&[], 12, 3, &totals, date(2024, 6, 1));
        assert_eq!(overview.net_cash, Decimal::new(20_000, 0));
        assert_eq!(overview.member_count, 12);
        assert_eq!(overview.total_groups, 0);
    }

    #[test]
    fn test_group_summary_totals() {
        let g = group(date(2024, 1, 5), 20, "active", &["anil", "bina"]);
        let other = Uuid::new_v4();
        let collections = vec![
            collection(g.id, "anil", 2_500, date(2024, 1, 5), 1001),
            collection(g.id, "anil", 2_500, date(2024, 2, 5), 1002),
            collection(g.id, "bina", 2_500, date(2024, 1, 6), 1003),
            collection(g.id, "chandra", 1_000, date(2024, 1, 7), 1004),
            collection(other, "anil", 9_999, date(2024, 1, 7), 1005),
        ];

        let summary = summarize_group(g, &collections, Vec::new(), date(2024, 2, 10));

        assert_eq!(summary.total_collected, Decimal::new(8_500, 0));
        // 2 installments due x 2 members x 2500
        assert_eq!(summary.expected_to_date, Decimal::new(10_000, 0));
        assert_eq!(summary.outstanding, Decimal::new(1_500, 0));
        assert_eq!(summary.term_target, Decimal::new(100_000, 0));
        assert_eq!(summary.progress_percent, Decimal::new(850, 2));
        assert!(!summary.is_closed);

        let names: Vec<&str> = summary.member_totals.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["anil", "bina", "chandra"]);
        assert_eq!(summary.member_totals[0].collected, Decimal::new(5_000, 0));
        assert_eq!(summary.member_totals[0].installments_paid, 2);
    }

    #[test]
    fn test_group_summary_lists_unpaid_members() {
        let g = group(date(2024, 1, 5), 10, "active", &["anil", "bina"]);
        let summary = summarize_group(g, &[], Vec::new(), date(2023, 12, 1));
        assert_eq!(summary.member_totals.len(), 2);
        assert!(summary.member_totals.iter().all(|m| m.collected.is_zero()));
        assert_eq!(summary.outstanding, Decimal::ZERO);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(Decimal::ONE, Decimal::new(3, 0)), Decimal::new(3333, 2));
        assert_eq!(percent(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_merge_history_sorted_newest_first() {
        let gid = Uuid::new_v4();
        let collections = vec![
            collection(gid, "anil", 2_500, date(2024, 1, 5), 1001),
            collection(gid, "anil", 2_500, date(2024, 3, 5), 1003),
        ];
        let payments = vec![
            payment(gid, "anil", 45_000, date(2024, 3, 5)),
            payment(gid, "anil", 100, date(2024, 2, 1)),
        ];

        let history = merge_history(collections, payments);

        let kinds: Vec<(HistoryKind, NaiveDate)> =
            history.entries.iter().map(|e| (e.kind, e.date)).collect();
        assert_eq!(
            kinds,
            vec![
                // same day: payout created later in the day comes first
                (HistoryKind::Payout, date(2024, 3, 5)),
                (HistoryKind::Collection, date(2024, 3, 5)),
                (HistoryKind::Payout, date(2024, 2, 1)),
                (HistoryKind::Collection, date(2024, 1, 5)),
            ]
        );
        assert_eq!(history.total_paid, Decimal::new(5_000, 0));
        assert_eq!(history.total_received, Decimal::new(45_100, 0));
        assert_eq!(history.entries[1].receipt_no, Some(1003));
    }

    #[test]
    fn test_merge_history_empty() {
        let history = merge_history(Vec::new(), Vec::new());
        assert!(history.entries.is_empty());
        assert_eq!(history.total_paid, Decimal::ZERO);
    }

    #[test]
    fn test_employee_balance() {
        let employee_id = Uuid::new_v4();
        let totals = CreditTotals {
            received: Decimal::new(12_000, 0),
            sent: Decimal::new(15_500, 0),
        };
        let collections = vec![collection(Uuid::new_v4(), "anil", 2_500, date(2024, 1, 5), 1)];

        let balance = employee_balance(employee_id, &totals, &collections);
        assert_eq!(balance.balance, Decimal::new(-3_500, 0));
        assert_eq!(balance.collections_count, 1);
        assert_eq!(balance.collections_total, Decimal::new(2_500, 0));
    }
}
