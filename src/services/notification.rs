//! Outbound SMS and WhatsApp messages through the Twilio REST API.
//!
//! Every notification is sent on both channels. When no Twilio
//! credentials are configured the service runs in simulation mode: messages
//! are logged and given synthetic ids.

use crate::config::MessagingConfig;
use crate::error::{AppError, AppResult};
use crate::format::{format_date, format_inr, normalize_phone};
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
        }
    }

    /// Twilio addresses WhatsApp numbers with a `whatsapp:` prefix
    fn address(&self, phone: &str) -> String {
        match self {
            Channel::Sms => phone.to_string(),
            Channel::WhatsApp => format!("whatsapp:{}", phone),
        }
    }
}

/// Result of one channel's send attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub message_sid: Option<String>,
    pub error: Option<String>,
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        self.message_sid.is_some()
    }
}

/// Outcome of sending one notification on both channels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationOutcome {
    pub to: String,
    pub sms: ChannelOutcome,
    pub whatsapp: ChannelOutcome,
}

impl NotificationOutcome {
    pub fn any_delivered(&self) -> bool {
        self.sms.is_delivered() || self.whatsapp.is_delivered()
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: Option<String>,
    code: Option<i64>,
}

/// Receipt text sent after an installment is collected
pub fn collection_receipt_message(
    member_name: &str,
    amount: Decimal,
    group_name: &str,
    receipt_no: i64,
    collected_on: NaiveDate,
) -> String {
    format!(
        "Dear {}, we have received {} towards chit group \"{}\" on {}. Receipt no: {}. Thank you - ChitConnect",
        member_name,
        format_inr(amount),
        group_name,
        format_date(collected_on),
        receipt_no
    )
}

/// Announcement sent to group members after a monthly auction
pub fn auction_result_message(
    group_name: &str,
    month_number: i32,
    winner: &str,
    payout: Decimal,
    dividend: Decimal,
) -> String {
    format!(
        "ChitConnect: Month {} auction for \"{}\" won by {}. Payout: {}. Your dividend this month: {}.",
        month_number,
        group_name,
        winner,
        format_inr(payout),
        format_inr(dividend)
    )
}

/// Sends notifications through Twilio, or simulates them
pub struct NotificationService {
    config: MessagingConfig,
    client: Client,
}

impl NotificationService {
    pub fn new(config: MessagingConfig) -> Self {
        if config.is_simulated() {
            info!("Twilio credentials not configured, notifications run in simulation mode");
        }
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.config.is_simulated()
    }

    /// Send `body` to `phone` as SMS and as WhatsApp.
    ///
    /// Both channels are always attempted; a failure on one is reported in
    /// its outcome and does not stop the other. Fails only on a bad number
    /// or empty body.
    pub async fn send(&self, phone: &str, body: &str) -> AppResult<NotificationOutcome> {
        let to = normalize_phone(phone)?;
        if body.trim().is_empty() {
            return Err(AppError::Validation("Message body is required".to_string()));
        }

        let (sms, whatsapp) = futures::future::join(
            self.send_channel(Channel::Sms, &to, body),
            self.send_channel(Channel::WhatsApp, &to, body),
        )
        .await;

        let outcome = NotificationOutcome { to, sms, whatsapp };
        info!(
            "Notification to {}: sms={} whatsapp={}",
            outcome.to,
            outcome.sms.is_delivered(),
            outcome.whatsapp.is_delivered()
        );
        Ok(outcome)
    }

    async fn send_channel(&self, channel: Channel, to: &str, body: &str) -> ChannelOutcome {
        match self.dispatch(channel, to, body).await {
            Ok(sid) => ChannelOutcome {
                channel,
                message_sid: Some(sid),
                error: None,
            },
            Err(e) => {
                warn!("{} to {} failed: {}", channel.as_str(), to, e);
                ChannelOutcome {
                    channel,
                    message_sid: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn dispatch(&self, channel: Channel, to: &str, body: &str) -> AppResult<String> {
        let (Some(account_sid), Some(auth_token)) = (&self.config.account_sid, &self.config.auth_token)
        else {
            let sid = format!("SIM-{}", Uuid::new_v4().simple());
            info!("[simulated {}] to={} sid={} body={:?}", channel.as_str(), to, sid, body);
            return Ok(sid);
        };

        let from = match channel {
            Channel::Sms => self.config.sms_from.as_deref(),
            Channel::WhatsApp => self.config.whatsapp_from.as_deref(),
        }
        .ok_or_else(|| AppError::Config(format!("No sender configured for {}", channel.as_str())))?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            account_sid
        );
        let to_address = channel.address(to);
        let from_address = channel.address(from);
        let form = [
            ("To", to_address.as_str()),
            ("From", from_address.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let message: TwilioMessage = response
                .json()
                .await
                .map_err(|e| AppError::ExternalService(format!("Unexpected Twilio response: {}", e)))?;
            Ok(message.sid)
        } else {
            let detail = response
                .json::<TwilioError>()
                .await
                .ok()
                .map(|e| {
                    format!(
                        "{} (code {})",
                        e.message.unwrap_or_default(),
                        e.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
                    )
                })
                .unwrap_or_default();
            Err(AppError::ExternalService(format!("Twilio returned {}: {}", status, detail)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_receipt_message() {
        let msg = collection_receipt_message(
            "Anil",
            Decimal::new(250_000, 2),
            "Diwali 2024",
            1042,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        );
        assert_eq!(
            msg,
            "Dear Anil, we have received ₹2,500.00 towards chit group \"Diwali 2024\" on 05 Mar 2024. Receipt no: 1042. Thank you - ChitConnect"
        );
    }

    #[test]
    fn test_auction_result_message() {
        let msg = auction_result_message(
            "Diwali 2024",
            3,
            "bina",
            Decimal::new(88_000, 0),
            Decimal::new(600, 0),
        );
        assert!(msg.contains("Month 3"));
        assert!(msg.contains("won by bina"));
        assert!(msg.contains("₹88,000.00"));
        assert!(msg.contains("₹600.00"));
    }

    #[test]
    fn test_channel_address() {
        assert_eq!(Channel::Sms.address("+919876543210"), "+919876543210");
        assert_eq!(Channel::WhatsApp.address("+919876543210"), "whatsapp:+919876543210");
    }

    #[test]
    fn test_simulated_send_hits_both_channels() {
        let service = NotificationService::new(MessagingConfig::default());
        assert!(service.is_simulated());

        let outcome = tokio_test::block_on(service.send("98765 43210", "hello")).unwrap();
        assert_eq!(outcome.to, "+919876543210");
        assert_eq!(outcome.sms.channel, Channel::Sms);
        assert_eq!(outcome.whatsapp.channel, Channel::WhatsApp);
        assert!(outcome.sms.message_sid.as_deref().unwrap().starts_with("SIM-"));
        assert!(outcome.whatsapp.is_delivered());
        assert!(outcome.any_delivered());
    }

    #[test]
    fn test_send_rejects_bad_input() {
        let service = NotificationService::new(MessagingConfig::default());
        assert!(tokio_test::block_on(service.send("123", "hello")).is_err());
        assert!(tokio_test::block_on(service.send("9876543210", "  ")).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_per_channel_errors() {
        let config = MessagingConfig {
            account_sid: Some("AC0000".to_string()),
            auth_token: Some("token".to_string()),
            sms_from: Some("+15005550006".to_string()),
            whatsapp_from: Some("+14155238886".to_string()),
            // Nothing listens on the discard port
            api_base: "http://127.0.0.1:9".to_string(),
        };
        let service = NotificationService::new(config);

        let outcome = service.send("9876543210", "hello").await.unwrap();
        assert!(!outcome.any_delivered());
        assert!(outcome.sms.error.is_some());
        assert!(outcome.whatsapp.error.is_some());
    }
}
