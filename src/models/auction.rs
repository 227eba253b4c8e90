use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Result of one monthly bidding round
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuctionRecord {
    pub id: Uuid,
    pub group_id: Uuid,
    pub month_number: i32,
    pub winner_username: String,
    pub bid_amount: Decimal,
    pub payout_amount: Decimal,
    pub dividend_per_member: Decimal,
    pub auction_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAuction {
    pub group_id: Uuid,
    pub month_number: i32,
    pub winner_username: String,
    pub bid_amount: Decimal,
    pub payout_amount: Decimal,
    pub dividend_per_member: Decimal,
    pub auction_date: NaiveDate,
}

/// Payout and per-member dividend for a winning bid.
///
/// The bid is the discount the winner forgoes; it is shared equally among
/// all members, rounded to paise.
pub fn auction_terms(total_amount: Decimal, bid_amount: Decimal, member_count: usize) -> (Decimal, Decimal) {
    let payout = total_amount - bid_amount;
    let dividend = if member_count == 0 {
        Decimal::ZERO
    } else {
        (bid_amount / Decimal::from(member_count as u64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    (payout, dividend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auction_terms() {
        let (payout, dividend) =
            auction_terms(Decimal::new(100_000, 0), Decimal::new(12_000, 0), 20);
        assert_eq!(payout, Decimal::new(88_000, 0));
        assert_eq!(dividend, Decimal::new(600, 0));
    }

    #[test]
    fn test_dividend_rounds_to_paise() {
        let (_, dividend) = auction_terms(Decimal::new(10_000, 0), Decimal::new(1_000, 0), 3);
        assert_eq!(dividend, Decimal::new(33333, 2));
    }

    #[test]
    fn test_no_members_no_dividend() {
        let (_, dividend) = auction_terms(Decimal::new(10_000, 0), Decimal::new(1_000, 0), 0);
        assert_eq!(dividend, Decimal::ZERO);
    }
}
