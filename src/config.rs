use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Runtime
    pub environment: String,
    pub log_level: String,

    // Remote API
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_refresh_path: String,

    // Credentials
    pub token_store_path: Option<String>,

    // Polling
    pub poll_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "dovelink_client=debug".to_string()),

            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            token_refresh_path: env::var("TOKEN_REFRESH_PATH")
                .unwrap_or_else(|_| "auth/refresh/".to_string()),

            token_store_path: env::var("TOKEN_STORE_PATH").ok(),

            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.poll_interval_secs > 0, "POLL_INTERVAL_SECS must be greater than 0");
        anyhow::ensure!(self.request_timeout_secs > 0, "REQUEST_TIMEOUT_SECS must be greater than 0");
        url::Url::parse(&self.api_base_url)?;
        Ok(())
    }

    /// 指向给定服务地址的配置，其余取默认值
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "dovelink_client=debug".to_string(),
            api_base_url: "http://localhost:8000/api/".to_string(),
            request_timeout_secs: 30,
            token_refresh_path: "auth/refresh/".to_string(),
            token_store_path: None,
            poll_interval_secs: 30,
        }
    }
}
