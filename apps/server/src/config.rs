use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Run `initialize` during startup instead of waiting for POST /initialize.
    pub auto_initialize: bool,
    /// `None` disables the background rate update job.
    pub rate_update_interval: Option<Duration>,
    pub seed_rate: Decimal,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("PXL_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid PXL_LISTEN_ADDR")?;
        let db_path = std::env::var("PXL_DB_PATH").unwrap_or_else(|_| "./db/pxl.db".into());
        let cors_allow = std::env::var("PXL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("PXL_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let auto_initialize = std::env::var("PXL_AUTO_INITIALIZE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let interval_secs: u64 = std::env::var("PXL_RATE_UPDATE_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .unwrap_or(3600);
        let seed_rate = std::env::var("PXL_SEED_RATE")
            .ok()
            .map(|v| Decimal::from_str(v.trim()).context("Invalid PXL_SEED_RATE"))
            .transpose()?
            .unwrap_or(Decimal::ONE_HUNDRED);
        if seed_rate <= Decimal::ZERO {
            anyhow::bail!("PXL_SEED_RATE must be positive, got {}", seed_rate);
        }

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            auto_initialize,
            rate_update_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            seed_rate,
        })
    }
}
