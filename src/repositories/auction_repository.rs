use crate::error::RepositoryError;
use crate::models::{AuctionRecord, NewAuction};
use sqlx::PgPool;
use uuid::Uuid;

const AUCTION_COLUMNS: &str = "id, group_id, month_number, winner_username, bid_amount, payout_amount, \
                               dividend_per_member, auction_date, created_at";

const WINNER_CONSTRAINT: &str = "auctions_group_winner_key";

/// Repository for monthly auction results
pub struct AuctionRepository {
    pool: PgPool,
}

impl AuctionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an auction result; a repeated month or a repeated winner in the
    /// same group is rejected by the table's unique keys
    pub async fn create(&self, record: &NewAuction) -> Result<AuctionRecord, RepositoryError> {
        let created = sqlx::query_as::<_, AuctionRecord>(&format!(
            r#"
            INSERT INTO auctions
                (group_id, month_number, winner_username, bid_amount, payout_amount, dividend_per_member, auction_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {AUCTION_COLUMNS}
            "#
        ))
        .bind(record.group_id)
        .bind(record.month_number)
        .bind(&record.winner_username)
        .bind(record.bid_amount)
        .bind(record.payout_amount)
        .bind(record.dividend_per_member)
        .bind(record.auction_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let constraint = e
                .as_database_error()
                .and_then(|db| db.constraint())
                .map(str::to_string);
            match (RepositoryError::from(e), constraint.as_deref()) {
                (RepositoryError::Duplicate(_), Some(WINNER_CONSTRAINT)) => RepositoryError::BusinessRule(
                    format!("{} has already won an auction in this group", record.winner_username),
                ),
                (RepositoryError::Duplicate(_), _) => RepositoryError::BusinessRule(format!(
                    "Auction for month {} has already been recorded",
                    record.month_number
                )),
                (other, _) => other,
            }
        })?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuctionRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, AuctionRecord>(&format!(
            "SELECT {AUCTION_COLUMNS} FROM auctions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_all(&self) -> Result<Vec<AuctionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, AuctionRecord>(&format!(
            "SELECT {AUCTION_COLUMNS} FROM auctions ORDER BY auction_date DESC, month_number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<AuctionRecord>, RepositoryError> {
        let records = sqlx::query_as::<_, AuctionRecord>(&format!(
            "SELECT {AUCTION_COLUMNS} FROM auctions WHERE group_id = $1 ORDER BY month_number ASC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
