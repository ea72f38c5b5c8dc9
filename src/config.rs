use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_TOKEN_DB: &str = "sqlite://smart_scheduler.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub token_db_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_db_url: DEFAULT_TOKEN_DB.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `SCHEDULER_API_URL`, `SCHEDULER_TIMEOUT_SECS` and
    /// `SCHEDULER_TOKEN_DB`. Call `dotenvy::dotenv()` first to pick up a `.env`.
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("SCHEDULER_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = match env::var("SCHEDULER_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::Config(format!("SCHEDULER_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let token_db_url = env::var("SCHEDULER_TOKEN_DB")
            .unwrap_or_else(|_| DEFAULT_TOKEN_DB.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            token_db_url,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
