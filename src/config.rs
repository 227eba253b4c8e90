use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Messaging provider (Twilio) configuration.
///
/// When no credentials are configured the notification service runs in
/// simulation mode and only logs outgoing messages.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub sms_from: Option<String>,
    pub whatsapp_from: Option<String>,
    pub api_base: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub messaging: MessagingConfig,
    pub log_level: String,
    pub grpc_port: u16,
    pub environment: String,
    pub session_ttl_hours: i64,
    pub audit_log_dir: PathBuf,
}

/// Longest session a login may issue: ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// `None` when unset or blank; an error when set to something unparseable
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match env_non_empty(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid value for {}: {:?}", key, raw)),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10);
        let acquire_timeout_secs = env_parse::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS")?.unwrap_or(30);
        let idle_timeout_secs = env_parse::<u64>("DATABASE_IDLE_TIMEOUT_SECS")?.unwrap_or(600); // 10 minutes
        let max_lifetime_secs = env_parse::<u64>("DATABASE_MAX_LIFETIME_SECS")?.unwrap_or(1800); // 30 minutes
        let test_before_acquire = env_parse::<bool>("DATABASE_TEST_BEFORE_ACQUIRE")?.unwrap_or(true);

        let config = Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pool cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/chitconnect".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl MessagingConfig {
    /// Create messaging config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            account_sid: env_non_empty("TWILIO_ACCOUNT_SID"),
            auth_token: env_non_empty("TWILIO_AUTH_TOKEN"),
            sms_from: env_non_empty("TWILIO_SMS_FROM"),
            whatsapp_from: env_non_empty("TWILIO_WHATSAPP_FROM"),
            api_base: env_non_empty("TWILIO_API_BASE")
                .unwrap_or_else(|| "https://api.twilio.com".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Credentials come in pairs, and live mode needs both sender numbers
    pub fn validate(&self) -> Result<(), String> {
        match (&self.account_sid, &self.auth_token) {
            (Some(_), None) | (None, Some(_)) => Err(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must be set together".to_string(),
            ),
            (Some(_), Some(_)) if self.sms_from.is_none() || self.whatsapp_from.is_none() => Err(
                "TWILIO_SMS_FROM and TWILIO_WHATSAPP_FROM are required when Twilio credentials are set"
                    .to_string(),
            ),
            _ => Ok(()),
        }
    }

    /// True when no provider credentials are configured
    pub fn is_simulated(&self) -> bool {
        self.account_sid.is_none()
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            sms_from: None,
            whatsapp_from: None,
            api_base: "https://api.twilio.com".to_string(),
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let messaging = MessagingConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let grpc_port = env_parse::<u16>("GRPC_PORT")?.unwrap_or(50051);

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let session_ttl_hours = env_parse::<i64>("SESSION_TTL_HOURS")?.unwrap_or(12);

        let audit_log_dir = PathBuf::from(
            env::var("AUDIT_LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        );

        let config = Self {
            database,
            messaging,
            log_level: log_level.to_lowercase(),
            grpc_port,
            environment: environment.to_lowercase(),
            session_ttl_hours,
            audit_log_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field settings
    pub fn validate(&self) -> Result<(), String> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                self.environment, valid_environments
            ));
        }

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(format!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            ));
        }

        if self.is_production() && self.messaging.is_simulated() {
            return Err("Twilio credentials are required in production".to_string());
        }

        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Session lifetime as a chrono duration, held within the validated range
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            messaging: MessagingConfig::default(),
            log_level: "info".to_string(),
            grpc_port: 50051,
            environment: "development".to_string(),
            session_ttl_hours: 12,
            audit_log_dir: PathBuf::from("./logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_rejects_zero_connections() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.grpc_port, 50051);
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.session_ttl(), chrono::Duration::hours(12));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_messaging_credentials() {
        let config = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_messaging_credentials_must_be_paired() {
        let config = MessagingConfig {
            account_sid: Some("AC123".to_string()),
            ..MessagingConfig::default()
        };
        assert!(config.validate().is_err());

        let config = MessagingConfig {
            account_sid: Some("AC123".to_string()),
            auth_token: Some("secret".to_string()),
            sms_from: Some("+15005550006".to_string()),
            whatsapp_from: Some("+14155238886".to_string()),
            ..MessagingConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.is_simulated());
    }

    #[test]
    fn test_session_ttl_bounds() {
        let too_long = AppConfig {
            session_ttl_hours: 10_000_000_000,
            ..AppConfig::default()
        };
        assert!(too_long.validate().is_err());

        let zero = AppConfig {
            session_ttl_hours: 0,
            ..AppConfig::default()
        };
        assert!(zero.validate().is_err());

        let longest = AppConfig {
            session_ttl_hours: MAX_SESSION_TTL_HOURS,
            ..AppConfig::default()
        };
        assert!(longest.validate().is_ok());
        assert!(chrono::Utc::now()
            .naive_utc()
            .checked_add_signed(longest.session_ttl())
            .is_some());
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        env::set_var("CHITCONNECT_CONFIG_TEST_PORT", "abc");
        assert!(env_parse::<u16>("CHITCONNECT_CONFIG_TEST_PORT").is_err());

        env::set_var("CHITCONNECT_CONFIG_TEST_PORT", " 6000 ");
        assert_eq!(env_parse::<u16>("CHITCONNECT_CONFIG_TEST_PORT").unwrap(), Some(6000));

        env::set_var("CHITCONNECT_CONFIG_TEST_PORT", "");
        assert_eq!(env_parse::<u16>("CHITCONNECT_CONFIG_TEST_PORT").unwrap(), None);

        env::remove_var("CHITCONNECT_CONFIG_TEST_PORT");
        assert_eq!(env_parse::<u16>("CHITCONNECT_CONFIG_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = AppConfig {
            log_level: "verbose".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
