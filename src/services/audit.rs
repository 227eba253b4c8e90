use crate::error::{AppError, AppResult};
use crate::models::{AuctionRecord, CollectionRecord, Group, PaymentRecord};
use crate::services::notification::NotificationOutcome;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub event_type: String, // "login", "collection_recorded", "auction_recorded", etc.
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<String>,
    pub details: serde_json::Value,
}

/// Who performed an audited action
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: Uuid,
    pub role: &'a str,
}

/// Append-only JSON-lines trail of every write.
///
/// Entries go to `audit_<YYYY-MM-DD>.log` for the UTC day they are
/// written, so a long-running process rolls over to a new file each day.
pub struct AuditTrailService {
    log_directory: PathBuf,
    current: Mutex<OpenLog>,
}

struct OpenLog {
    date: NaiveDate,
    file: File,
}

fn open_log(log_directory: &Path, date: NaiveDate) -> AppResult<File> {
    let path = log_file_path(log_directory, date);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::Audit(format!("Failed to open audit log file {:?}: {}", path, e)))
}

fn log_file_path(log_directory: &Path, date: NaiveDate) -> PathBuf {
    log_directory.join(format!("audit_{}.log", date.format("%Y-%m-%d")))
}

impl AuditTrailService {
    pub fn new(log_directory: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&log_directory)
            .map_err(|e| AppError::Audit(format!("Failed to create log directory: {}", e)))?;

        let date = chrono::Utc::now().date_naive();
        let file = open_log(&log_directory, date)?;
        info!("Audit trail initialized in {:?}", log_directory);

        Ok(Self {
            log_directory,
            current: Mutex::new(OpenLog { date, file }),
        })
    }

    /// File receiving today's entries
    pub fn log_file(&self) -> PathBuf {
        log_file_path(&self.log_directory, chrono::Utc::now().date_naive())
    }

    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let date = chrono::DateTime::from_timestamp(entry.timestamp, 0)
            .map(|t| t.date_naive())
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let json = serde_json::to_string(&entry)?;
        self.append(date, &json).await
    }

    async fn append(&self, date: NaiveDate, line: &str) -> AppResult<()> {
        let mut current = self.current.lock().await;
        if current.date != date {
            current.file = open_log(&self.log_directory, date)?;
            current.date = date;
        }

        writeln!(current.file, "{}", line)
            .map_err(|e| AppError::Audit(format!("Failed to write audit log: {}", e)))?;
        current
            .file
            .flush()
            .map_err(|e| AppError::Audit(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Build and write an entry for `actor`
    pub async fn record(
        &self,
        event_type: &str,
        actor: Option<Actor<'_>>,
        details: serde_json::Value,
    ) -> AppResult<()> {
        self.log(AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: event_type.to_string(),
            actor_id: actor.map(|a| a.id),
            actor_role: actor.map(|a| a.role.to_string()),
            details,
        })
        .await
    }

    pub async fn log_login(&self, actor: Actor<'_>) -> AppResult<()> {
        self.record("login", Some(actor), serde_json::json!({})).await
    }

    pub async fn log_group_changed(&self, actor: Actor<'_>, action: &str, group: &Group) -> AppResult<()> {
        self.record(
            action,
            Some(actor),
            serde_json::json!({
                "group_id": group.id.to_string(),
                "name": group.name,
                "status": group.status,
                "members": group.members,
            }),
        )
        .await
    }

    pub async fn log_collection(&self, actor: Actor<'_>, record: &CollectionRecord) -> AppResult<()> {
        self.record(
            "collection_recorded",
            Some(actor),
            serde_json::json!({
                "collection_id": record.id.to_string(),
                "receipt_no": record.receipt_no,
                "group_id": record.group_id.to_string(),
                "member": record.member_username,
                "amount": record.amount.to_string(),
                "payment_mode": record.payment_mode,
            }),
        )
        .await
    }

    pub async fn log_payment(&self, actor: Actor<'_>, record: &PaymentRecord) -> AppResult<()> {
        self.record(
            "payment_recorded",
            Some(actor),
            serde_json::json!({
                "payment_id": record.id.to_string(),
                "group_id": record.group_id.to_string(),
                "member": record.member_username,
                "amount": record.amount.to_string(),
            }),
        )
        .await
    }

    pub async fn log_auction(&self, actor: Actor<'_>, record: &AuctionRecord) -> AppResult<()> {
        self.record(
            "auction_recorded",
            Some(actor),
            serde_json::json!({
                "auction_id": record.id.to_string(),
                "group_id": record.group_id.to_string(),
                "month": record.month_number,
                "winner": record.winner_username,
                "bid_amount": record.bid_amount.to_string(),
                "payout_amount": record.payout_amount.to_string(),
            }),
        )
        .await
    }

    pub async fn log_notification(&self, actor: Actor<'_>, outcome: &NotificationOutcome) -> AppResult<()> {
        self.record(
            "notification_sent",
            Some(actor),
            serde_json::json!({
                "to": outcome.to,
                "sms_sid": outcome.sms.message_sid,
                "whatsapp_sid": outcome.whatsapp.message_sid,
                "sms_error": outcome.sms.error,
                "whatsapp_error": outcome.whatsapp.error,
            }),
        )
        .await
    }
}
